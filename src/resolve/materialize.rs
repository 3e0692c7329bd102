use crate::models::{AssetPlan, AssetSource, InjectableAsset, InjectionManifest, PlannedAsset};

/// Resolve final URLs for every planned asset.
///
/// This is the second phase of the two-phase interface: [`super::resolve`]
/// produces a plan with output-relative paths, and `materialize` applies the
/// resolved public path and optional build hash once the host has supplied
/// them. The public path precedence is the plan's own `public_path`, else
/// the host's configured value, else the empty string.
pub fn materialize(
    plan: &AssetPlan,
    host_public_path: Option<&str>,
    build_hash: Option<&str>,
) -> InjectionManifest {
    let public_path = plan
        .public_path
        .as_deref()
        .or(host_public_path)
        .unwrap_or("");
    let hash = if plan.hash { build_hash } else { None };

    InjectionManifest {
        prepend: plan
            .prepend
            .iter()
            .map(|asset| materialize_asset(asset, public_path, hash))
            .collect(),
        append: plan
            .append
            .iter()
            .map(|asset| materialize_asset(asset, public_path, hash))
            .collect(),
        files: plan.files.clone(),
    }
}

fn materialize_asset(
    asset: &PlannedAsset,
    public_path: &str,
    hash: Option<&str>,
) -> InjectableAsset {
    let mut url = match &asset.source {
        AssetSource::Remote(url) => url.clone(),
        AssetSource::Copied(relative) => join_public_path(public_path, relative),
    };

    if let Some(hash) = hash {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(hash);
    }

    InjectableAsset {
        url,
        kind: asset.kind,
        attributes: asset.attributes.clone(),
    }
}

/// Join the public path prefix onto an output-relative asset path with a
/// single separating slash.
fn join_public_path(public_path: &str, relative: &str) -> String {
    if public_path.is_empty() {
        relative.to_string()
    } else {
        format!(
            "{}/{}",
            public_path.trim_end_matches('/'),
            relative.trim_start_matches('/')
        )
    }
}
