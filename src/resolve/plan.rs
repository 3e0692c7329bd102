use crate::config::ExternalsConfig;
use crate::models::{AssetPlan, AssetSource, CopyInstruction, ExternalsMap, PlannedAsset};
use crate::resolve::entries::normalize_entry;
use crate::resolve::urls::is_remote_path;

/// Derive the complete asset plan from a validated configuration.
///
/// A single pass over `externals` in declaration order fills the externals
/// map, the prepend/append injection lists, and the copy list. Remote
/// entries are injected with their URL untouched and never copied; local
/// entries are rewritten to `{module}/{path}` for the copy source and
/// `{output_path}/{module}/{path}` for both the copy destination and the
/// injected path. Supplements contribute to the copy list only.
///
/// The pass is pure and infallible for configurations that passed
/// [`ExternalsConfig::validate`]; callers own validation. With
/// `enabled: false` the returned plan is empty.
pub fn resolve(config: &ExternalsConfig) -> AssetPlan {
    let mut plan = AssetPlan {
        externals: ExternalsMap::new(),
        prepend: Vec::new(),
        append: Vec::new(),
        copies: Vec::new(),
        output_path: config.output_path.clone(),
        public_path: config.public_path.clone(),
        hash: config.hash,
        files: config.files.clone(),
    };

    if !config.enabled {
        return plan;
    }

    for spec in &config.externals {
        if plan
            .externals
            .insert(spec.module.clone(), spec.global.clone())
            .is_some()
        {
            // Conflicting bindings never pass validation, so only benign
            // duplicates reach this overwrite.
            tracing::warn!(
                module = %spec.module,
                "module declared more than once; entries accumulate across declarations"
            );
        }

        for entry in spec.entry.iter() {
            let normalized = normalize_entry(entry);
            let asset = if is_remote_path(&normalized.path) {
                PlannedAsset {
                    source: AssetSource::Remote(normalized.path),
                    kind: normalized.kind,
                    attributes: normalized.attributes,
                }
            } else {
                let module_relative = format!("{}/{}", spec.module, normalized.path);
                let destination = format!("{}/{}", config.output_path, module_relative);
                plan.copies.push(CopyInstruction {
                    source: module_relative,
                    destination: destination.clone(),
                    options: normalized.copy_options.merged_over(&config.copy_options),
                });
                PlannedAsset {
                    source: AssetSource::Copied(destination),
                    kind: normalized.kind,
                    attributes: normalized.attributes,
                }
            };

            if spec.append {
                plan.append.push(asset);
            } else {
                plan.prepend.push(asset);
            }
        }

        for supplement in &spec.supplements {
            let module_relative = format!("{}/{}", spec.module, supplement.path());
            let options = supplement
                .copy_options()
                .cloned()
                .unwrap_or_default()
                .merged_over(&config.copy_options);
            plan.copies.push(CopyInstruction {
                source: module_relative.clone(),
                destination: format!("{}/{}", config.output_path, module_relative),
                options,
            });
        }
    }

    plan
}
