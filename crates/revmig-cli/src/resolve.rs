use revmig_core::PlacesConfig;

use crate::clients::build_places_client;

pub(crate) async fn run_resolve(config: &PlacesConfig, name: &str, address: &str) -> anyhow::Result<()> {
    let client = build_places_client(config)?;
    match client.resolve(name, address).await? {
        Some(place) => {
            println!("place id: {}", place.id);
            println!("location: {}, {}", place.lat, place.lng);
            println!("types: {}", place.category_tags.join(", "));
        }
        None => println!("no place found for '{name}' at '{address}'"),
    }
    Ok(())
}
