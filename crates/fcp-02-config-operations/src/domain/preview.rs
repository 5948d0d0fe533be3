//! JSON summary of a `ConfigUpdate` for display before signing.

use fcp_01_block_codec::proto::common::{ConfigGroup, ConfigUpdate};
use serde_json::{json, Map, Value};

fn versions<'a>(entries: impl Iterator<Item = (&'a String, u64)>) -> Value {
    entries
        .map(|(k, v)| (k.clone(), json!(v)))
        .collect::<Map<_, _>>()
        .into()
}

fn summarize(group: &ConfigGroup) -> Value {
    json!({
        "version": group.version,
        "mod_policy": group.mod_policy,
        "groups": group
            .groups
            .iter()
            .map(|(k, g)| (k.clone(), summarize(g)))
            .collect::<Map<_, _>>(),
        "values": versions(group.values.iter().map(|(k, v)| (k, v.version))),
        "policies": versions(group.policies.iter().map(|(k, p)| (k, p.version))),
    })
}

fn collect_changes(
    path: &str,
    write: &ConfigGroup,
    read: Option<&ConfigGroup>,
    out: &mut Vec<String>,
) {
    if read.map_or(true, |r| r.version != write.version) {
        out.push(path.to_string());
    }
    for (key, value) in &write.values {
        let before = read.and_then(|r| r.values.get(key)).map(|v| v.version);
        if before != Some(value.version) {
            out.push(format!("{path}/values/{key}"));
        }
    }
    for (key, policy) in &write.policies {
        let before = read.and_then(|r| r.policies.get(key)).map(|p| p.version);
        if before != Some(policy.version) {
            out.push(format!("{path}/policies/{key}"));
        }
    }
    for (key, child) in &write.groups {
        let before = read.and_then(|r| r.groups.get(key));
        collect_changes(&format!("{path}/groups/{key}"), child, before, out);
    }
}

/// Paths (`Channel/groups/Application/groups/Org3MSP`, ...) whose version the
/// update writes.
pub fn changed_paths(update: &ConfigUpdate) -> Vec<String> {
    let mut out = Vec::new();
    if let Some(write) = &update.write_set {
        collect_changes("Channel", write, update.read_set.as_ref(), &mut out);
    }
    out
}

/// `preview_json`: read set, write set and changed paths.
pub fn update_preview(update: &ConfigUpdate) -> Value {
    json!({
        "channel_id": update.channel_id,
        "read_set": update.read_set.as_ref().map(summarize),
        "write_set": update.write_set.as_ref().map(summarize),
        "changes": changed_paths(update),
    })
}
