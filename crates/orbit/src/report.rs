// SPDX-FileCopyrightText: 2026 Orbit Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text reports for `orbit check` and `orbit diff`.

use std::fmt::Write;

use orbit_config::OrbitConfig;
use orbit_reload::{AdapterConfigManager, affected_dependent_kinds, detect_changes};

/// Adapter summary for a validated configuration.
pub fn render_check(config: &OrbitConfig) -> String {
    let mut out = String::new();
    let manager = AdapterConfigManager::new();
    let stats = manager.load(&config.adapters);

    let _ = writeln!(
        out,
        "configuration OK: {} enabled, {} disabled, {} skipped",
        stats.enabled, stats.disabled, stats.skipped
    );

    for (name, adapter) in manager.snapshot().iter() {
        let provider = adapter
            .inference_provider
            .as_deref()
            .or(config.general.inference_provider.as_deref())
            .unwrap_or("(none)");
        let model = adapter.model.as_deref().unwrap_or("(default)");
        let datasource = adapter.datasource.as_deref().unwrap_or("(none)");
        let _ = writeln!(
            out,
            "  {name}: provider={provider} model={model} datasource={datasource}"
        );
    }

    out
}

/// What a bulk reload from `old` to `new` would change.
pub fn render_diff(old: &OrbitConfig, new: &OrbitConfig) -> String {
    let manager = AdapterConfigManager::new();
    manager.load(&old.adapters);
    let before = manager.snapshot();
    let changes = manager.reconcile(&new.adapters);
    let after = manager.snapshot();

    if changes.is_noop() {
        return format!("no adapter changes ({} unchanged)\n", changes.unchanged.len());
    }

    let mut out = String::new();
    for name in &changes.added {
        let _ = writeln!(out, "+ {name}");
    }
    for name in &changes.removed {
        let _ = writeln!(out, "- {name}");
    }
    for name in &changes.updated {
        let _ = writeln!(out, "~ {name}");
        let (Some(old_cfg), Some(new_cfg)) = (before.get(name), after.get(name)) else {
            continue;
        };
        for change in detect_changes(old_cfg, new_cfg) {
            let _ = writeln!(out, "    {change}");
        }
        let affected = affected_dependent_kinds(old_cfg, new_cfg);
        if affected.whole_adapter {
            let _ = writeln!(out, "    invalidates: all dependencies");
        } else if !affected.kinds.is_empty() {
            let kinds: Vec<String> = affected.kinds.iter().map(|k| k.to_string()).collect();
            let _ = writeln!(out, "    invalidates: {}", kinds.join(", "));
        }
    }
    let _ = writeln!(out, "{} unchanged", changes.unchanged.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbit_core::AdapterConfig;

    fn config(adapters: Vec<AdapterConfig>) -> OrbitConfig {
        OrbitConfig {
            adapters,
            ..OrbitConfig::default()
        }
    }

    #[test]
    fn check_lists_enabled_adapters() {
        let mut cfg = config(vec![
            AdapterConfig::named("qa-sql")
                .with_inference("ollama", Some("llama3"))
                .with_datasource("sqlite"),
            AdapterConfig::named("faq"),
            AdapterConfig::named("off").with_enabled(false),
        ]);
        cfg.general.inference_provider = Some("openai".into());

        let out = render_check(&cfg);
        assert!(out.starts_with("configuration OK: 2 enabled, 1 disabled, 0 skipped\n"));
        assert!(out.contains("  faq: provider=openai model=(default) datasource=(none)\n"));
        assert!(out.contains("  qa-sql: provider=ollama model=llama3 datasource=sqlite\n"));
        assert!(!out.contains("off:"));
    }

    #[test]
    fn diff_reports_every_change() {
        let old = config(vec![
            AdapterConfig::named("qa-sql").with_inference("ollama", Some("llama3")),
            AdapterConfig::named("legacy-faq"),
            AdapterConfig::named("docs"),
        ]);
        let new = config(vec![
            AdapterConfig::named("qa-sql").with_inference("ollama", Some("llama3.1")),
            AdapterConfig::named("support-bot"),
            AdapterConfig::named("docs"),
        ]);

        let out = render_diff(&old, &new);
        assert_eq!(
            out,
            "+ support-bot\n- legacy-faq\n~ qa-sql\n    model: llama3 -> llama3.1\n    invalidates: provider\n1 unchanged\n"
        );
    }

    #[test]
    fn diff_without_changes() {
        let cfg = config(vec![AdapterConfig::named("qa-sql")]);
        assert_eq!(render_diff(&cfg, &cfg), "no adapter changes (1 unchanged)\n");
    }
}
