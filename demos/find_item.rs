//! Finds a collection and one of its items.
//!
//! Reads `WEBFLOW_API_TOKEN` and `WEBFLOW_SITE_ID` from the environment.
//!
//! Run with: `cargo run --example find_item -- <collection name> <item name>`

use webflow::{ClientBuilder, CollectionItem, Error, ItemLookup, WebflowApi};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("webflow=debug,find_item=info")
        .init();

    let mut args = std::env::args().skip(1);
    let collection_name = args.next().unwrap_or_else(|| "Blog Posts".to_string());
    let item_name = args.next().unwrap_or_default();

    let client = ClientBuilder::from_env()?.build()?;

    println!("=== Collections ===");
    for collection in client.list_collections().await? {
        println!("{} ({}) slug={}", collection.name, collection.id, collection.slug);
    }
    println!();

    let Some(collection) = client.find_collection_by_name(&collection_name).await? else {
        println!("No collection named {:?}", collection_name);
        return Ok(());
    };

    println!("=== Items in {} ===", collection.name);
    for raw in client.list_items(&collection.id, 10).await? {
        let item = CollectionItem::from_raw(&raw)?;
        println!("{} ({}) draft={}", item.name, item.id, item.draft);
    }
    println!();

    if item_name.is_empty() {
        return Ok(());
    }

    let lookup = ItemLookup::new()
        .collection_id(&collection.id)
        .item_name(&item_name);

    match client.get_item(&lookup).await? {
        Some(raw) => println!("Found {:?}: {}", item_name, raw.get()),
        None => println!("No item named {:?}", item_name),
    }

    Ok(())
}
