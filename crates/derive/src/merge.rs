use pathmodel_schema::{BranchMap, InternalNode, SchemaNode};

/// Fold per-group schemas into one, largest group first.
///
/// `groups` pairs each group's schema with its path count. The largest group
/// (lowest index on ties) is the base. Other groups contribute keys the base
/// lacks verbatim, and labels missing under a shared key; shared labels
/// merge recursively while both sides are mappings. The base always wins
/// when a shared label ends in a leaf on either side.
#[must_use]
pub fn merge_group_schemas(groups: &[(InternalNode, usize)]) -> InternalNode {
    let Some(base_idx) = largest(groups) else {
        return InternalNode::new();
    };

    let mut merged = groups[base_idx].0.clone();
    for (idx, (schema, _)) in groups.iter().enumerate() {
        if idx != base_idx {
            merge_into(&mut merged, schema);
        }
    }
    merged
}

fn largest(groups: &[(InternalNode, usize)]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for (idx, (_, count)) in groups.iter().enumerate() {
        if best.map_or(true, |(_, top)| *count > top) {
            best = Some((idx, *count));
        }
    }
    best.map(|(idx, _)| idx)
}

fn merge_into(base: &mut InternalNode, other: &InternalNode) {
    for entry in other.entries() {
        if let Some(existing) = base.entry_mut(entry.key()) {
            merge_branches(existing.branches_mut(), entry.branches());
        } else {
            base.push_entry(entry.key(), entry.branches().clone());
        }
    }
}

fn merge_branches(base: &mut BranchMap, other: &BranchMap) {
    for branch in other.iter() {
        match base.get_mut(branch.label().as_str()) {
            Some(existing) => {
                if let (SchemaNode::Internal(into), SchemaNode::Internal(from)) =
                    (existing.node_mut(), branch.node())
                {
                    merge_into(into, from);
                }
            }
            None => base.push(branch.label().clone(), branch.node().clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pathmodel_schema::Schema;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    fn node(value: Value) -> InternalNode {
        Schema::from_value(&value).unwrap().into_root()
    }

    #[test]
    fn largest_group_is_the_base() {
        let merged = merge_group_schemas(&[
            (node(json!({"kind": {"log": "{filename}.txt"}})), 1),
            (node(json!({"region": {"us": "{filename}.parquet"}})), 4),
        ]);
        assert_eq!(
            merged.to_value(),
            json!({
                "region": {"us": "{filename}.parquet"},
                "kind": {"log": "{filename}.txt"}
            })
        );
    }

    #[test]
    fn ties_keep_the_first_group() {
        let merged = merge_group_schemas(&[
            (node(json!({"k": {"a": "{filename}.json"}})), 2),
            (node(json!({"k": {"a": "{filename}.csv"}})), 2),
        ]);
        assert_eq!(merged.to_value(), json!({"k": {"a": "{filename}.json"}}));
    }

    #[test]
    fn shared_labels_merge_recursively() {
        let merged = merge_group_schemas(&[
            (
                node(json!({"region": {"us": {"sensor": {"lidar": "{filename}.bin"}}}})),
                3,
            ),
            (
                node(json!({"region": {
                    "us": {"sensor": {"rgb": "{filename}.jpg"}, "date": {"d1": "{filename}"}},
                    "eu": "{filename}.csv"
                }})),
                2,
            ),
        ]);
        assert_eq!(
            merged.to_value(),
            json!({"region": {
                "us": {
                    "sensor": {"lidar": "{filename}.bin", "rgb": "{filename}.jpg"},
                    "date": {"d1": "{filename}"}
                },
                "eu": "{filename}.csv"
            }})
        );
    }

    #[test]
    fn base_leaf_wins_over_mapping() {
        let merged = merge_group_schemas(&[
            (node(json!({"k": {"a": "{filename}"}})), 5),
            (node(json!({"k": {"a": {"x": {"1": "{filename}"}}}})), 1),
        ]);
        assert_eq!(merged.to_value(), json!({"k": {"a": "{filename}"}}));
    }

    #[test]
    fn no_groups_is_empty() {
        assert!(merge_group_schemas(&[]).is_empty());
    }
}
