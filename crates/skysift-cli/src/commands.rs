//! Handlers for `search`, `query`, and `langs`.

use std::sync::Arc;

use chrono::Utc;
use skysift_client::{LanguageSource, SkysiftClient};
use skysift_query::CompiledRequest;
use skysift_search::{HydrationCache, RunOutcome, SearchPipeline};

use crate::Result;
use crate::cli::SearchArgs;
use crate::config::SkysiftConfig;
use crate::render::render_results;

/// Languages to search in when the user gave none.
///
/// Preferred languages are narrowed to those the index has seen. If the
/// listing cannot be fetched the preferred list is used as is.
pub async fn default_languages<S>(source: &S, config: &SkysiftConfig) -> Vec<String>
where
    S: LanguageSource + ?Sized,
{
    let preferred = &config.search.preferred_languages;
    if preferred.is_empty() {
        return Vec::new();
    }
    match source.languages().await {
        Ok(facets) => facets.default_selection(preferred),
        Err(err) => {
            tracing::warn!(error = %err, "could not list languages; using preferred languages");
            preferred.clone()
        }
    }
}

/// Name for the search in result headers and empty-state messages.
///
/// The free text when there is some, otherwise the compiled query, so a
/// filter-only search still says what it matched against.
fn results_label(text: &str, request: &CompiledRequest) -> String {
    let text = text.trim();
    if text.is_empty() {
        request.query.clone()
    } else {
        text.to_string()
    }
}

/// Run a search and print the results.
pub async fn run_search(config: &SkysiftConfig, args: &SearchArgs) -> Result<()> {
    let client = Arc::new(SkysiftClient::new(&config.client)?);

    let languages = if args.languages.is_empty() && !args.text().trim().is_empty() {
        default_languages(client.as_ref(), config).await
    } else {
        Vec::new()
    };
    let criteria = args.to_criteria(&languages, config.search.exclude_known_labels);
    let request = skysift_query::compile(&criteria);
    let label = results_label(&args.text(), &request);

    let cache = Arc::new(HydrationCache::with_capacity(
        client.clone(),
        config.cache.hydration_capacity,
    ));
    let pipeline = SearchPipeline::new(client, cache)
        .with_search_cache_capacity(config.cache.search_capacity);

    tracing::debug!(q = %request.query, "submitting search");
    match pipeline.submit_request(request).await {
        RunOutcome::Completed(result) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(result.as_ref())?);
            } else {
                print!("{}", render_results(&result, &label, Utc::now()));
            }
            Ok(())
        }
        RunOutcome::Failed(err) => Err(err.into()),
        RunOutcome::Superseded | RunOutcome::NoRequest => Ok(()),
    }
}

/// Print the compiled request as JSON.
///
/// Never touches the network, so preferred languages are used unfiltered.
pub fn run_query(config: &SkysiftConfig, args: &SearchArgs) -> Result<()> {
    let criteria = args.to_criteria(
        &config.search.preferred_languages,
        config.search.exclude_known_labels,
    );
    let request = skysift_query::compile(&criteria);
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}

/// List the languages the index has seen, defaults first and starred.
pub async fn run_langs(config: &SkysiftConfig) -> Result<()> {
    let client = SkysiftClient::new(&config.client)?;
    let facets = client.languages().await?;
    let preferred = &config.search.preferred_languages;
    let defaults = facets.default_selection(preferred);

    for code in facets.options(preferred) {
        let marker = if defaults.contains(&code) { "*" } else { " " };
        println!("{marker} {code}");
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
