use crate::config;
use crate::exceptions::ParleyError;
use crate::providers::{self, ProviderFlags};
use futures_util::future::join_all;

/// Lists the model catalogue per provider, one concurrent request per
/// provider, joined before anything is printed.
pub async fn run(flags: ProviderFlags) -> Result<(), ParleyError> {
    let config = config::load_config()?;
    let selected = providers::selected_providers(&flags);

    let fetches = selected.iter().map(|provider| {
        let config = &config;
        async move { (*provider, providers::list_models(*provider, config).await) }
    });
    let results = join_all(fetches).await;

    for (provider, models) in results {
        let models = models?;

        println!("\n{}", provider.name().to_uppercase());
        println!("{}", "─".repeat(40));

        for model in models {
            let marker = if model.id == provider.default_model() {
                " (default)"
            } else {
                ""
            };
            println!("  {}{}", model.id, marker);
            if let Some(detail) = model.detail() {
                println!("    {}", detail);
            }
        }
    }
    println!();

    Ok(())
}
