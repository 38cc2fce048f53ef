use crate::engine::{RouteOutcome, Routed, RoutingEngine};
use crate::matcher::match_branch;
use crate::packet::Packet;
use crate::sanitize::pair_segment;
use crate::sink::SinkClass;
use crate::template::{render_template, MissingPlaceholder};
use pathmodel_schema::{InternalNode, SchemaNode};
use std::path::{Component, Path, PathBuf};

impl RoutingEngine {
    /// Compute the destination of a packet.
    ///
    /// Pure: the same packet and schema always give the same path (sink
    /// filenames also embed the engine clock's stamp). The result is always
    /// under the engine root.
    ///
    /// At each node the entries are scanned in order. A reached key that the
    /// packet lacks ends the walk in the missing-attribute sink, so when the
    /// first key is absent no later key is tried. A present key whose value
    /// matches no label passes to the next entry; when every entry fails the
    /// packet lands in the no-matching-branch sink.
    #[must_use]
    pub fn route(&self, packet: &Packet) -> Routed {
        let mut path = self.config.root.clone();
        let mut node: &InternalNode = self.schema.root();

        loop {
            let mut next = None;

            for entry in node.entries() {
                let Some(value) = packet.get(entry.key()) else {
                    log::debug!("Packet lacks '{}', routing to sink", entry.key());
                    return self.sink(SinkClass::MissingAttribute, packet);
                };

                if let Some(branch) = match_branch(value, entry.branches()) {
                    path.push(pair_segment(entry.key(), branch.label().as_str()));
                    next = Some(branch.node());
                    break;
                }
            }

            match next {
                Some(SchemaNode::Internal(child)) => node = child,
                Some(SchemaNode::Leaf(template)) => return self.finish(path, template, packet),
                None => {
                    log::debug!("No branch matched at {}, routing to sink", path.display());
                    return self.sink(SinkClass::NoMatchingBranch, packet);
                }
            }
        }
    }

    fn sink(&self, class: SinkClass, packet: &Packet) -> Routed {
        Routed {
            path: self.sink_path(class, packet),
            outcome: RouteOutcome::Sink(class),
        }
    }

    fn finish(&self, mut path: PathBuf, template: &str, packet: &Packet) -> Routed {
        let rendered = match render_template(template, packet) {
            Ok(rendered) => confine(&rendered).ok_or(String::new()),
            Err(MissingPlaceholder(name)) => Err(name),
        };

        match rendered {
            Ok(relative) => {
                path.push(relative);
                Routed {
                    path,
                    outcome: RouteOutcome::Resolved,
                }
            }
            Err(placeholder) => {
                log::debug!("Template '{template}' left '{placeholder}' unrendered");
                path.push(self.unrendered_filename(&placeholder, packet));
                Routed {
                    path,
                    outcome: RouteOutcome::Sink(SinkClass::UnrenderedTemplate),
                }
            }
        }
    }
}

/// Keep only normal components of a rendered filename so it cannot climb
/// out of the walked directories. `None` when nothing remains.
fn confine(rendered: &str) -> Option<PathBuf> {
    let normalized = rendered.replace('\\', "/");
    let relative: PathBuf = Path::new(&normalized)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect();

    if relative.as_os_str().is_empty() {
        None
    } else {
        Some(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::FixedClock;
    use pathmodel_schema::{BranchLabel, BranchMap, Schema};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn engine(schema: serde_json::Value) -> RoutingEngine {
        RoutingEngine::new(Schema::from_value(&schema).unwrap(), "lake")
            .with_clock(FixedClock::new("T0"))
    }

    fn drone() -> RoutingEngine {
        engine(json!({
            "sensor": {
                "lidar": {"altitude": {">100": "{timestamp}_high.parquet", "<=100": "{timestamp}_low.parquet"}},
                "thermal": {"quality": {"raw": "{timestamp}_raw.tiff", "processed": "{timestamp}_cal.tiff"}},
                "rgb": "{timestamp}_rgb.jpg"
            }
        }))
    }

    #[test]
    fn routes_through_nested_predicates() {
        let routed = drone().route(
            &Packet::new()
                .with("sensor", "lidar")
                .with("altitude", 450)
                .with("timestamp", "20260112_0900"),
        );
        assert_eq!(
            routed.path,
            PathBuf::from("lake/sensor=lidar/altitude=gt_100/20260112_0900_high.parquet")
        );
        assert!(routed.is_resolved());

        let routed = drone().route(
            &Packet::new()
                .with("sensor", "lidar")
                .with("altitude", 100)
                .with("timestamp", "t"),
        );
        assert_eq!(
            routed.path,
            PathBuf::from("lake/sensor=lidar/altitude=lte_100/t_low.parquet")
        );
    }

    #[test]
    fn leaf_directly_under_label() {
        let routed = drone().route(&Packet::new().with("sensor", "rgb").with("timestamp", "t"));
        assert_eq!(routed.path, PathBuf::from("lake/sensor=rgb/t_rgb.jpg"));
    }

    #[test]
    fn unknown_value_goes_to_no_match_sink() {
        let routed = drone().route(
            &Packet::new()
                .with("sensor", "sonar")
                .with("timestamp", "t")
                .with("id", "p7"),
        );
        assert_eq!(routed.sink(), Some(SinkClass::NoMatchingBranch));
        assert_eq!(
            routed.path,
            PathBuf::from("lake/_intake/no-matching-branch/p7_T0")
        );
    }

    #[test]
    fn missing_key_goes_to_missing_sink() {
        let routed = drone().route(&Packet::new().with("timestamp", "t"));
        assert_eq!(routed.sink(), Some(SinkClass::MissingAttribute));
        assert_eq!(
            routed.path,
            PathBuf::from("lake/_intake/missing-attribute/unknown_T0")
        );
    }

    #[test]
    fn missing_first_key_short_circuits_multi_key_node() {
        let engine = engine(json!({
            "outcome": {"success": "{s}.json"},
            "tool": {"code": "{s}.json"}
        }));
        let routed = engine.route(&Packet::new().with("tool", "code").with("s", "x"));
        assert_eq!(routed.sink(), Some(SinkClass::MissingAttribute));
    }

    #[test]
    fn unmatched_key_falls_through_to_next_entry() {
        let engine = engine(json!({
            "outcome": {"success": "{s}.json"},
            "tool": {"code": "{s}.json"}
        }));
        let routed = engine.route(
            &Packet::new()
                .with("outcome", "partial")
                .with("tool", "code")
                .with("s", "x"),
        );
        assert_eq!(routed.path, PathBuf::from("lake/tool=code/x.json"));

        let routed = engine.route(&Packet::new().with("outcome", "partial").with("s", "x"));
        assert_eq!(routed.sink(), Some(SinkClass::MissingAttribute));

        let routed = engine.route(
            &Packet::new()
                .with("outcome", "partial")
                .with("tool", "shell")
                .with("s", "x"),
        );
        assert_eq!(routed.sink(), Some(SinkClass::NoMatchingBranch));
    }

    #[test]
    fn unrendered_template_keeps_walked_segments() {
        let routed = drone().route(&Packet::new().with("sensor", "rgb").with("id", "a/b"));
        assert_eq!(routed.sink(), Some(SinkClass::UnrenderedTemplate));
        assert_eq!(
            routed.path,
            PathBuf::from("lake/sensor=rgb/unrendered-template_timestamp_ab_T0")
        );
    }

    #[test]
    fn rendered_values_cannot_escape_root() {
        let engine = engine(json!({"k": {"a": "{name}.json"}}));
        let routed = engine.route(&Packet::new().with("k", "a").with("name", "../../etc/passwd"));
        assert_eq!(routed.path, PathBuf::from("lake/k=a/etc/passwd.json"));

        let routed = engine.route(&Packet::new().with("k", "a").with("name", "/abs"));
        assert_eq!(routed.path, PathBuf::from("lake/k=a/abs.json"));
    }

    #[test]
    fn keys_built_in_code_stay_under_root() {
        let mut branches = BranchMap::new();
        branches.push(BranchLabel::literal("a"), SchemaNode::leaf("{n}.json"));
        let mut root = InternalNode::new();
        root.push_entry("/etc/cron.d", branches.clone());
        let engine = RoutingEngine::new(Schema::new(root), "lake");
        let routed = engine.route(&Packet::new().with("/etc/cron.d", "a").with("n", "x"));
        assert_eq!(routed.path, PathBuf::from("lake/etc_cron.d=a/x.json"));

        let mut root = InternalNode::new();
        root.push_entry("../../up", branches);
        let engine = RoutingEngine::new(Schema::new(root), "lake");
        let routed = engine.route(&Packet::new().with("../../up", "a").with("n", "x"));
        assert_eq!(routed.path, PathBuf::from("lake/up=a/x.json"));
    }

    #[test]
    fn empty_rendered_name_is_unrendered() {
        let engine = engine(json!({"k": {"a": "{name}"}}));
        let routed = engine.route(&Packet::new().with("k", "a").with("name", ".."));
        assert_eq!(routed.sink(), Some(SinkClass::UnrenderedTemplate));
        assert!(routed.path.starts_with("lake/k=a"));
    }

    #[test]
    fn empty_schema_is_no_match() {
        let routed = engine(json!({})).route(&Packet::new().with("x", 1));
        assert_eq!(routed.sink(), Some(SinkClass::NoMatchingBranch));
    }
}
