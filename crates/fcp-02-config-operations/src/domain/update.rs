//! # Config Update Diff
//!
//! Computes the read set / write set pair between two channel configs.
//!
//! Rules:
//! - A changed value or policy is written with `version + 1`; a new one with
//!   version 0. Unchanged entries are omitted.
//! - A group's own version is bumped only when its membership (keys added or
//!   removed) or its `mod_policy` changes. In that case every unchanged
//!   sibling is referenced in both sets by version only, so the orderer can
//!   verify nothing else moved.
//! - A group that merely contains changes keeps its version and appears in
//!   both sets as a path to the change.

use std::collections::BTreeMap;

use fcp_01_block_codec::proto::common::{
    Config, ConfigGroup, ConfigPolicy, ConfigUpdate, ConfigValue,
};

use super::errors::ConfigOpError;

struct MapDiff<T> {
    read: BTreeMap<String, T>,
    write: BTreeMap<String, T>,
    same: BTreeMap<String, T>,
    members_updated: bool,
}

impl<T> MapDiff<T> {
    fn new() -> Self {
        Self {
            read: BTreeMap::new(),
            write: BTreeMap::new(),
            same: BTreeMap::new(),
            members_updated: false,
        }
    }
}

fn diff_policies(
    original: &BTreeMap<String, ConfigPolicy>,
    updated: &BTreeMap<String, ConfigPolicy>,
) -> MapDiff<ConfigPolicy> {
    let mut diff = MapDiff::new();
    for (name, orig) in original {
        let Some(upd) = updated.get(name) else {
            diff.members_updated = true;
            continue;
        };
        if orig.mod_policy == upd.mod_policy && orig.policy == upd.policy {
            diff.same.insert(
                name.clone(),
                ConfigPolicy {
                    version: orig.version,
                    ..Default::default()
                },
            );
            continue;
        }
        diff.write.insert(
            name.clone(),
            ConfigPolicy {
                version: orig.version + 1,
                policy: upd.policy.clone(),
                mod_policy: upd.mod_policy.clone(),
            },
        );
    }
    for (name, upd) in updated {
        if original.contains_key(name) {
            continue;
        }
        diff.members_updated = true;
        diff.write.insert(
            name.clone(),
            ConfigPolicy {
                version: 0,
                policy: upd.policy.clone(),
                mod_policy: upd.mod_policy.clone(),
            },
        );
    }
    diff
}

fn diff_values(
    original: &BTreeMap<String, ConfigValue>,
    updated: &BTreeMap<String, ConfigValue>,
) -> MapDiff<ConfigValue> {
    let mut diff = MapDiff::new();
    for (name, orig) in original {
        let Some(upd) = updated.get(name) else {
            diff.members_updated = true;
            continue;
        };
        if orig.mod_policy == upd.mod_policy && orig.value == upd.value {
            diff.same.insert(
                name.clone(),
                ConfigValue {
                    version: orig.version,
                    ..Default::default()
                },
            );
            continue;
        }
        diff.write.insert(
            name.clone(),
            ConfigValue {
                version: orig.version + 1,
                value: upd.value.clone(),
                mod_policy: upd.mod_policy.clone(),
            },
        );
    }
    for (name, upd) in updated {
        if original.contains_key(name) {
            continue;
        }
        diff.members_updated = true;
        diff.write.insert(
            name.clone(),
            ConfigValue {
                version: 0,
                value: upd.value.clone(),
                mod_policy: upd.mod_policy.clone(),
            },
        );
    }
    diff
}

fn diff_groups(
    original: &BTreeMap<String, ConfigGroup>,
    updated: &BTreeMap<String, ConfigGroup>,
) -> MapDiff<ConfigGroup> {
    let mut diff = MapDiff::new();
    for (name, orig) in original {
        let Some(upd) = updated.get(name) else {
            diff.members_updated = true;
            continue;
        };
        let (read, write, changed) = diff_group(orig, upd);
        if !changed {
            diff.same.insert(name.clone(), read);
            continue;
        }
        diff.read.insert(name.clone(), read);
        diff.write.insert(name.clone(), write);
    }
    for (name, upd) in updated {
        if original.contains_key(name) {
            continue;
        }
        diff.members_updated = true;
        let (_, write, _) = diff_group(&ConfigGroup::default(), upd);
        diff.write.insert(
            name.clone(),
            ConfigGroup {
                version: 0,
                groups: write.groups,
                values: write.values,
                policies: write.policies,
                mod_policy: upd.mod_policy.clone(),
            },
        );
    }
    diff
}

/// Returns `(read_set, write_set, changed)` for one group.
fn diff_group(original: &ConfigGroup, updated: &ConfigGroup) -> (ConfigGroup, ConfigGroup, bool) {
    let mut policies = diff_policies(&original.policies, &updated.policies);
    let mut values = diff_values(&original.values, &updated.values);
    let mut groups = diff_groups(&original.groups, &updated.groups);

    let members_updated = policies.members_updated
        || values.members_updated
        || groups.members_updated
        || original.mod_policy != updated.mod_policy;

    if !members_updated {
        let untouched = policies.read.is_empty()
            && policies.write.is_empty()
            && values.read.is_empty()
            && values.write.is_empty()
            && groups.read.is_empty()
            && groups.write.is_empty();
        if untouched {
            let version_only = ConfigGroup {
                version: original.version,
                ..Default::default()
            };
            return (version_only.clone(), version_only, false);
        }
        let read = ConfigGroup {
            version: original.version,
            groups: groups.read,
            values: values.read,
            policies: policies.read,
            mod_policy: String::new(),
        };
        let write = ConfigGroup {
            version: original.version,
            groups: groups.write,
            values: values.write,
            policies: policies.write,
            mod_policy: String::new(),
        };
        return (read, write, true);
    }

    for (name, same) in std::mem::take(&mut policies.same) {
        policies.read.insert(name.clone(), same.clone());
        policies.write.insert(name, same);
    }
    for (name, same) in std::mem::take(&mut values.same) {
        values.read.insert(name.clone(), same.clone());
        values.write.insert(name, same);
    }
    for (name, same) in std::mem::take(&mut groups.same) {
        groups.read.insert(name.clone(), same.clone());
        groups.write.insert(name, same);
    }

    let read = ConfigGroup {
        version: original.version,
        groups: groups.read,
        values: values.read,
        policies: policies.read,
        mod_policy: String::new(),
    };
    let write = ConfigGroup {
        version: original.version + 1,
        groups: groups.write,
        values: values.write,
        policies: policies.write,
        mod_policy: updated.mod_policy.clone(),
    };
    (read, write, true)
}

/// Compute the `ConfigUpdate` that moves `original` to `updated`.
///
/// `channel_id` is left empty; the caller stamps it.
pub fn compute_update(original: &Config, updated: &Config) -> Result<ConfigUpdate, ConfigOpError> {
    let orig = original
        .channel_group
        .as_ref()
        .ok_or_else(|| ConfigOpError::required("original.channel_group"))?;
    let upd = updated
        .channel_group
        .as_ref()
        .ok_or_else(|| ConfigOpError::required("updated.channel_group"))?;

    let (read_set, write_set, changed) = diff_group(orig, upd);
    if !changed {
        return Err(ConfigOpError::NoDifferences);
    }
    Ok(ConfigUpdate {
        channel_id: String::new(),
        read_set: Some(read_set),
        write_set: Some(write_set),
        isolated_data: BTreeMap::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(bytes: &[u8], version: u64) -> ConfigValue {
        ConfigValue {
            version,
            value: bytes.to_vec(),
            mod_policy: "Admins".to_string(),
        }
    }

    fn config(root: ConfigGroup) -> Config {
        Config {
            sequence: 1,
            channel_group: Some(root),
        }
    }

    fn two_level() -> ConfigGroup {
        let mut org1 = ConfigGroup {
            version: 2,
            mod_policy: "Admins".into(),
            ..Default::default()
        };
        org1.values.insert("MSP".into(), value(b"msp1", 1));
        let mut org2 = org1.clone();
        org2.values.insert("MSP".into(), value(b"msp2", 0));

        let mut app = ConfigGroup {
            version: 5,
            mod_policy: "Admins".into(),
            ..Default::default()
        };
        app.groups.insert("Org1MSP".into(), org1);
        app.groups.insert("Org2MSP".into(), org2);

        let mut root = ConfigGroup::default();
        root.groups.insert("Application".into(), app);
        root.values.insert("Capabilities".into(), value(b"v2", 0));
        root
    }

    #[test]
    fn test_identical_configs_have_no_differences() {
        let c = config(two_level());
        assert!(matches!(
            compute_update(&c, &c),
            Err(ConfigOpError::NoDifferences)
        ));
    }

    #[test]
    fn test_modified_value_bumps_only_the_value() {
        let original = config(two_level());
        let mut root = two_level();
        let org1 = root
            .groups
            .get_mut("Application")
            .and_then(|app| app.groups.get_mut("Org1MSP"))
            .unwrap();
        org1.values.insert("MSP".into(), value(b"msp1-new", 1));
        let updated = config(root);

        let update = compute_update(&original, &updated).unwrap();
        let write = update.write_set.unwrap();
        let app = &write.groups["Application"];
        assert_eq!(app.version, 5);
        assert_eq!(app.groups.len(), 1);
        let org1 = &app.groups["Org1MSP"];
        assert_eq!(org1.version, 2);
        assert_eq!(org1.values["MSP"].version, 2);
        assert_eq!(org1.values["MSP"].value, b"msp1-new");
        assert!(write.values.is_empty());
    }

    #[test]
    fn test_added_group_bumps_parent_and_references_siblings() {
        let original = config(two_level());
        let mut root = two_level();
        let mut org3 = ConfigGroup {
            mod_policy: "Admins".into(),
            ..Default::default()
        };
        org3.values.insert("MSP".into(), value(b"msp3", 7));
        root.groups
            .get_mut("Application")
            .unwrap()
            .groups
            .insert("Org3MSP".into(), org3);
        let updated = config(root);

        let update = compute_update(&original, &updated).unwrap();
        let read = update.read_set.unwrap();
        let write = update.write_set.unwrap();
        let read_app = &read.groups["Application"];
        let write_app = &write.groups["Application"];

        assert_eq!(read_app.version, 5);
        assert_eq!(write_app.version, 6);
        assert_eq!(write_app.mod_policy, "Admins");
        // siblings referenced by version only
        assert_eq!(write_app.groups["Org1MSP"], ConfigGroup { version: 2, ..Default::default() });
        assert_eq!(read_app.groups["Org2MSP"], ConfigGroup { version: 2, ..Default::default() });
        // new group written at version 0, its values at version 0
        let org3 = &write_app.groups["Org3MSP"];
        assert_eq!(org3.version, 0);
        assert_eq!(org3.values["MSP"].version, 0);
        assert!(!read_app.groups.contains_key("Org3MSP"));
    }

    #[test]
    fn test_removed_group_bumps_parent() {
        let original = config(two_level());
        let mut root = two_level();
        root.groups.get_mut("Application").unwrap().groups.remove("Org2MSP");
        let updated = config(root);

        let write = compute_update(&original, &updated).unwrap().write_set.unwrap();
        let app = &write.groups["Application"];
        assert_eq!(app.version, 6);
        assert!(app.groups.contains_key("Org1MSP"));
        assert!(!app.groups.contains_key("Org2MSP"));
    }

    #[test]
    fn test_missing_channel_group_rejected() {
        let empty = Config::default();
        assert!(compute_update(&empty, &config(two_level())).is_err());
    }
}
