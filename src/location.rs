// Location resolution: templated URL -> concrete request URL

use anyhow::{Context, Result};
use url::Url;

use crate::template::{Template, Vars};

/// Expand a templated location into the URL a request should target.
///
/// Relative expansions are joined against `base`; absolute expansions stand
/// on their own. No network I/O happens here - the result is handed to the
/// transport layer as-is.
pub fn resolve(base: Option<&Url>, template: &Template, vars: &Vars) -> Result<Url> {
    let expanded = template
        .expand(vars)
        .with_context(|| format!("failed to expand '{}'", template.raw()))?;

    let url = match base {
        Some(base) => base
            .join(&expanded)
            .with_context(|| format!("cannot resolve '{}' against '{}'", expanded, base))?,
        None => expanded
            .parse::<Url>()
            .with_context(|| format!("expanded location '{}' is not an absolute URL", expanded))?,
    };
    Ok(url)
}
