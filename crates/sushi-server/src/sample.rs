//! Demo catalog

use std::collections::HashMap;
use sushi_core::{Result, Sushi, SushiRepository};
use tracing::{debug, info};

pub fn sushis() -> HashMap<String, Sushi> {
    [
        Sushi::new(
            "01D3XZ38KDR",
            "1",
            "California Roll",
            vec![
                "Crab".into(),
                "Avocado".into(),
                "Cucumber".into(),
                "Sesame seeds".into(),
            ],
        ),
        Sushi::new(
            "01D3XZ38TRE",
            "2",
            "Tiger Roll",
            vec![
                "Avocado".into(),
                "Cucumber".into(),
                "Tobiko".into(),
                "Shrimp tempura".into(),
            ],
        ),
        Sushi::new(
            "01D3XZ38KLE",
            "3",
            "Crunch Roll",
            vec![
                "Spicy tuna".into(),
                "Crispy seaweed".into(),
                "Tempura".into(),
            ],
        ),
    ]
    .into_iter()
    .map(|sushi| (sushi.id.clone(), sushi))
    .collect()
}

/// Create the demo records that aren't in `repository` yet
pub async fn seed(repository: &dyn SushiRepository) -> Result<usize> {
    let mut created = 0;
    for sushi in sushis().into_values() {
        match repository.create_sushi(&sushi).await {
            Ok(()) => created += 1,
            Err(e) if e.is_already_exists() => {
                debug!("Sample sushi {} already present", sushi.id);
            }
            Err(e) => return Err(e),
        }
    }

    info!("Seeded {} sample sushis", created);
    Ok(created)
}
