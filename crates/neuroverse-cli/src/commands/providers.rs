//! Providers command implementation.

use crate::error::Result;
use crate::output::Formatter;
use neuroverse_llm::ProviderRouter;

/// Print the provider chain and which keys are present.
pub fn execute_providers(router: &ProviderRouter, formatter: &Formatter) -> Result<()> {
    println!("{}", formatter.format_providers(router.providers())?);

    if router.list_available().is_empty() {
        eprintln!(
            "{}",
            formatter.warning("No provider keys set. Export at least one *_API_KEY variable.")
        );
    }
    Ok(())
}
