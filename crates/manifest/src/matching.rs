//! Matching live resources to manifest entries.
//!
//! Matching is best-effort: it never fails, and every questionable decision
//! is reported as a [`MatchWarning`].

use crate::types::Manifest;
use declarative::LiveResource;
use std::fmt;

/// Something the operator should look at after matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchWarning {
    /// Bound by name only; the manifest did not know this identifier
    MatchedByName {
        type_tag: String,
        manifest_id: String,
        remote_id: String,
        name: String,
    },
    /// Live resource has no manifest entry and would be deleted on apply
    UnmatchedLive {
        type_tag: String,
        description: String,
    },
    /// Manifest entry has no live resource and would be created on apply
    UnmatchedManifest {
        type_tag: String,
        manifest_id: String,
    },
}

impl fmt::Display for MatchWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchWarning::MatchedByName {
                type_tag,
                manifest_id,
                remote_id,
                name,
            } => write!(
                f,
                "live {type_tag} resource {name} (id {remote_id}) does not match a resource ID in \
                 the manifest, but its name matches manifest entry {manifest_id}; assuming they \
                 are the same resource"
            ),
            MatchWarning::UnmatchedLive {
                type_tag,
                description,
            } => write!(
                f,
                "live {type_tag} resource {description} could not be matched to any resource in \
                 the manifest and will be deleted if the configuration is applied"
            ),
            MatchWarning::UnmatchedManifest {
                type_tag,
                manifest_id,
            } => write!(
                f,
                "manifest entry {manifest_id} ({type_tag}) has no live resource and will be \
                 created if the configuration is applied"
            ),
        }
    }
}

/// Outcome of matching a manifest against live state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// Number of live resources bound to a manifest entry
    pub matched: usize,
    pub warnings: Vec<MatchWarning>,
}

impl MatchReport {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn warn(&mut self, warning: MatchWarning) {
        log::warn!("{warning}");
        self.warnings.push(warning);
    }
}

impl Manifest {
    /// Bind live resources to manifest entries for `environment`.
    ///
    /// Sets the correlation of every matched live resource and records newly
    /// discovered identifiers on the manifest entries. Identifier matches
    /// always win over name matches; among several same-named candidates the
    /// smallest remote identifier is chosen.
    pub fn match_live(&mut self, live: &mut [LiveResource], environment: &str) -> MatchReport {
        let mut report = MatchReport::default();
        for resource in live.iter_mut() {
            resource.manifest_id = None;
        }
        let mut live_open: Vec<bool> = live.iter().map(|r| !r.is_system).collect();
        let mut entry_open = vec![true; self.resources.len()];

        // Identifier pass
        for (entry_index, entry) in self.resources.iter_mut().enumerate() {
            let Some(target) = entry.resource_id(environment).map(str::to_string) else {
                continue;
            };
            let found = live.iter().enumerate().position(|(i, r)| {
                live_open[i] && r.type_tag == entry.type_tag && r.remote_id == target
            });
            let Some(live_index) = found else {
                continue;
            };
            live[live_index].manifest_id = Some(entry.manifest_id.clone());
            live_open[live_index] = false;
            entry_open[entry_index] = false;
            report.matched += 1;
            if entry.explicit_resource_id(environment).is_none() {
                entry.resource_ids.insert(environment.to_string(), target);
            }
        }

        // Name-fallback pass
        for (entry_index, entry) in self.resources.iter_mut().enumerate() {
            if !entry_open[entry_index] || entry.explicit_resource_id(environment).is_some() {
                continue;
            }
            let Some(name) = entry.name() else {
                continue;
            };
            let found = live
                .iter()
                .enumerate()
                .filter(|(i, r)| {
                    live_open[*i] && r.type_tag == entry.type_tag && r.name() == Some(name)
                })
                .min_by(|(_, a), (_, b)| a.remote_id.cmp(&b.remote_id))
                .map(|(i, _)| i);
            let Some(live_index) = found else {
                continue;
            };
            let resource = &mut live[live_index];
            report.warn(MatchWarning::MatchedByName {
                type_tag: entry.type_tag.clone(),
                manifest_id: entry.manifest_id.clone(),
                remote_id: resource.remote_id.clone(),
                name: name.to_string(),
            });
            resource.manifest_id = Some(entry.manifest_id.clone());
            entry
                .resource_ids
                .insert(environment.to_string(), resource.remote_id.clone());
            live_open[live_index] = false;
            entry_open[entry_index] = false;
            report.matched += 1;
        }

        for (i, resource) in live.iter().enumerate() {
            if live_open[i] {
                report.warn(MatchWarning::UnmatchedLive {
                    type_tag: resource.type_tag.clone(),
                    description: resource.describe(),
                });
            }
        }
        for (i, entry) in self.resources.iter().enumerate() {
            if entry_open[i] {
                report.warn(MatchWarning::UnmatchedManifest {
                    type_tag: entry.type_tag.clone(),
                    manifest_id: entry.manifest_id.clone(),
                });
            }
        }

        log::info!(
            "matched {} of {} live resources ({} warnings)",
            report.matched,
            live.len(),
            report.warnings.len()
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DEFAULT_ENVIRONMENT, ManifestResource};

    const COL1: &str = "fe20fd48-a006-4ad8-9208-4aad540d8794";
    const COL2: &str = "c860a6d7-c632-4f81-8f5f-597290a9f437";

    fn column(manifest_id: &str, name: &str, env: &str, id: &str) -> ManifestResource {
        ManifestResource::new("userstore_column", manifest_id)
            .with_resource_id(env, id)
            .with_attribute("name", name)
    }

    fn live_column(id: &str, name: &str) -> LiveResource {
        LiveResource::new("userstore_column", id).with_attribute("name", name)
    }

    fn correlations(live: &[LiveResource]) -> Vec<Option<&str>> {
        live.iter().map(|r| r.manifest_id.as_deref()).collect()
    }

    #[test]
    fn test_basic_match_by_id() {
        for (first, second) in [((COL1, "col1"), (COL2, "col2")), ((COL2, "col2"), (COL1, "col1"))]
        {
            let mut manifest = Manifest::new(vec![
                column("col1", "col1", DEFAULT_ENVIRONMENT, COL1),
                column("col2", "col2", DEFAULT_ENVIRONMENT, COL2),
            ]);
            let mut live = vec![
                live_column(first.0, first.1),
                live_column(second.0, second.1),
            ];

            let report = manifest.match_live(&mut live, "prod");

            assert!(report.is_clean(), "{:?}", report.warnings);
            assert_eq!(report.matched, 2);
            for resource in &live {
                assert_eq!(resource.manifest_id.as_deref(), resource.name());
            }
            assert_eq!(manifest.resources[0].resource_ids["prod"], COL1);
            assert_eq!(manifest.resources[1].resource_ids["prod"], COL2);
        }
    }

    #[test]
    fn test_id_match_beats_swapped_names() {
        let mut manifest = Manifest::new(vec![
            column("first", "col2", "prod", COL1),
            column("second", "col1", "prod", COL2),
        ]);
        let mut live = vec![live_column(COL1, "col1"), live_column(COL2, "col2")];

        let report = manifest.match_live(&mut live, "prod");

        assert!(report.is_clean());
        assert_eq!(correlations(&live), vec![Some("first"), Some("second")]);
    }

    #[test]
    fn test_match_by_name_warns_and_records_id() {
        let mut manifest = Manifest::new(vec![column(
            "col1",
            "col1",
            DEFAULT_ENVIRONMENT,
            "00000000-0000-0000-0000-000000000001",
        )]);
        let mut live = vec![live_column(COL1, "col1")];

        let report = manifest.match_live(&mut live, "prod");

        assert_eq!(
            report.warnings,
            vec![MatchWarning::MatchedByName {
                type_tag: "userstore_column".into(),
                manifest_id: "col1".into(),
                remote_id: COL1.into(),
                name: "col1".into(),
            }]
        );
        assert_eq!(live[0].manifest_id.as_deref(), Some("col1"));
        assert_eq!(manifest.resources[0].resource_ids["prod"], COL1);
    }

    #[test]
    fn test_explicit_id_is_never_reassigned_by_name() {
        let mut manifest = Manifest::new(vec![column(
            "col1",
            "col1",
            "prod",
            "00000000-0000-0000-0000-000000000001",
        )]);
        let mut live = vec![live_column(COL1, "col1")];

        let report = manifest.match_live(&mut live, "prod");

        assert_eq!(live[0].manifest_id, None);
        assert_eq!(report.matched, 0);
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(
            manifest.resources[0].resource_ids["prod"],
            "00000000-0000-0000-0000-000000000001"
        );
    }

    #[test]
    fn test_missing_live_resource_warns_once() {
        let mut manifest = Manifest::new(vec![
            column("col1", "col1", DEFAULT_ENVIRONMENT, COL1),
            column("col2", "col2", DEFAULT_ENVIRONMENT, COL2),
        ]);
        let mut live = vec![live_column(COL1, "col1")];

        let report = manifest.match_live(&mut live, "prod");

        assert_eq!(
            report.warnings,
            vec![MatchWarning::UnmatchedManifest {
                type_tag: "userstore_column".into(),
                manifest_id: "col2".into(),
            }]
        );
    }

    #[test]
    fn test_unmatched_live_resource_warns_once() {
        let mut manifest = Manifest::new(vec![column("col1", "col1", DEFAULT_ENVIRONMENT, COL1)]);
        let mut live = vec![live_column(COL1, "col1"), live_column(COL2, "col2")];

        let report = manifest.match_live(&mut live, "prod");

        assert_eq!(report.warnings.len(), 1);
        assert!(matches!(
            &report.warnings[0],
            MatchWarning::UnmatchedLive { description, .. }
                if description == &format!("col2 (id {COL2})")
        ));
        assert_eq!(live[1].manifest_id, None);
    }

    #[test]
    fn test_system_resources_are_never_matched() {
        let mut manifest = Manifest::new(vec![column("col1", "col1", DEFAULT_ENVIRONMENT, COL1)]);
        let mut live = vec![live_column(COL1, "col1").system()];

        let report = manifest.match_live(&mut live, "prod");

        assert_eq!(live[0].manifest_id, None);
        assert_eq!(
            report.warnings,
            vec![MatchWarning::UnmatchedManifest {
                type_tag: "userstore_column".into(),
                manifest_id: "col1".into(),
            }]
        );
    }

    #[test]
    fn test_matching_is_type_scoped() {
        let mut manifest = Manifest::new(vec![
            ManifestResource::new("userstore_purpose", "p1")
                .with_resource_id(DEFAULT_ENVIRONMENT, COL1)
                .with_attribute("name", "col1"),
        ]);
        let mut live = vec![live_column(COL1, "col1")];

        let report = manifest.match_live(&mut live, "prod");

        assert_eq!(live[0].manifest_id, None);
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_name_tie_break_picks_smallest_remote_id() {
        let mut manifest = Manifest::new(vec![
            ManifestResource::new("userstore_column", "col1").with_attribute("name", "dup"),
        ]);
        let mut live = vec![live_column(COL1, "dup"), live_column(COL2, "dup")];

        manifest.match_live(&mut live, "prod");

        // COL2 ("c860...") sorts before COL1 ("fe20...")
        assert_eq!(correlations(&live), vec![None, Some("col1")]);
    }

    #[test]
    fn test_rematching_resets_previous_correlations() {
        let mut manifest = Manifest::new(vec![column("col1", "col1", DEFAULT_ENVIRONMENT, COL1)]);
        let mut live = vec![live_column(COL2, "col2")];
        live[0].manifest_id = Some("stale".into());

        manifest.match_live(&mut live, "prod");

        assert_eq!(live[0].manifest_id, None);
    }
}
