//! Walks through the contacts server API against a running server

use reqwest::Client;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};

const SERVER_URL: &str = "http://localhost:8080";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let client = Client::new();

    // Example 1: Add an entry
    println!("1. Add Entry:");
    let resp = client
        .post(format!("{SERVER_URL}/entry"))
        .json(&json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "Ada@Example.com",
            "phone": "555-0100"
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    let stored: Value = resp.json().await?;
    println!("Body: {stored}");
    println!();

    let id = stored["_id"].as_str().unwrap_or_default().to_string();

    // Example 2: Fetch it back
    println!("2. Get Entry by ID:");
    let resp = client.get(format!("{SERVER_URL}/entry/{id}")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 3: Replace it
    println!("3. Update Entry:");
    let resp = client
        .put(format!("{SERVER_URL}/entry"))
        .json(&json!({
            "_id": id,
            "first_name": "Ada",
            "last_name": "King",
            "email": "ada@example.com",
            "phone": "555-0199"
        }))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!();

    // Example 4: Import more entries from CSV
    println!("4. Import CSV:");
    let csv = "ID,FirstName,LastName,Email,Phone\n\
               ,Grace,Hopper,grace@example.com,555-0142\n\
               ,Augusta,King,ada@example.com,555-0143\n";
    let part = Part::text(csv).file_name("entries.csv").mime_str("text/csv")?;
    let resp = client
        .post(format!("{SERVER_URL}/csv/entry"))
        .multipart(Form::new().part("file", part))
        .send()
        .await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 5: List everything
    println!("5. List Entries:");
    let resp = client.get(format!("{SERVER_URL}/entry")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body: {}", resp.text().await?);
    println!();

    // Example 6: Export as CSV
    println!("6. Export CSV:");
    let resp = client.get(format!("{SERVER_URL}/csv/entry")).send().await?;
    println!("Status: {}", resp.status());
    println!("Body:\n{}", resp.text().await?);

    // Example 7: Delete the first entry
    println!("7. Delete Entry:");
    let resp = client
        .delete(format!("{SERVER_URL}/entry/{id}"))
        .send()
        .await?;
    println!("Status: {}", resp.status());

    Ok(())
}
