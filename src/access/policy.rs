use std::collections::BTreeSet;

use crate::access::errors::AccessError;
use crate::access::types::*;
use crate::site::SiteConfig;
use kdl::{KdlDocument, KdlNode};

/// Parse a KDL document string into typed site, group and member records.
pub fn parse_kdl_document(source: &str) -> Result<ParsedPolicy, AccessError> {
    let doc: KdlDocument = source
        .parse()
        .map_err(|e: kdl::KdlError| AccessError::KdlParse(e.to_string()))?;

    let mut policy = ParsedPolicy::default();

    for node in doc.nodes() {
        match node.name().value() {
            "site" => policy.sites.push(parse_site(node)?),
            "group" => {
                let id = first_string_arg(node).ok_or_else(|| {
                    AccessError::InvalidPolicy(
                        "group node requires a string argument (e.g. group \"editors\")".into(),
                    )
                })?;

                let mut permissions = BTreeSet::new();
                if let Some(children) = node.children() {
                    for child in children.nodes() {
                        match child.name().value() {
                            "permissions" => {
                                permissions = dash_list(child)?.into_iter().collect();
                            }
                            other => {
                                return Err(AccessError::InvalidPolicy(format!(
                                    "unexpected child `{other}` in group `{id}` (expected `permissions`)"
                                )));
                            }
                        }
                    }
                }

                policy.groups.push(GroupDef {
                    id: GroupId(id),
                    permissions,
                });
            }
            "member" => {
                let id = first_string_arg(node).ok_or_else(|| {
                    AccessError::InvalidPolicy(
                        "member node requires a string argument (e.g. member \"7\")".into(),
                    )
                })?;

                let mut groups = BTreeSet::new();
                let mut admin = false;
                if let Some(children) = node.children() {
                    for child in children.nodes() {
                        match child.name().value() {
                            "groups" => {
                                groups = group_list(child)?;
                            }
                            "admin" => admin = true,
                            other => {
                                return Err(AccessError::InvalidPolicy(format!(
                                    "unexpected child `{other}` in member `{id}` (expected `groups` or `admin`)"
                                )));
                            }
                        }
                    }
                }

                policy.members.push(MemberDef {
                    id: MemberId(id),
                    groups,
                    admin,
                });
            }
            other => {
                tracing::warn!("ignoring unknown top-level KDL node `{other}`");
            }
        }
    }

    Ok(policy)
}

fn parse_site(node: &KdlNode) -> Result<SiteConfig, AccessError> {
    let id = first_string_arg(node).ok_or_else(|| {
        AccessError::InvalidPolicy(
            "site node requires a string argument (e.g. site \"main\")".into(),
        )
    })?;

    let mut site = SiteConfig::with_defaults(id);

    let Some(children) = node.children() else {
        return Ok(site);
    };

    for child in children.nodes() {
        let name = child.name().value();
        match name {
            "title" => site.title = required_string(child, &site.id)?,
            "tagline" => site.tagline = required_string(child, &site.id)?,
            "theme" => site.theme = Some(required_string(child, &site.id)?),
            "view" => {
                site.policy.view_mode = required_string(child, &site.id)?.parse()?;
                site.policy.viewer_groups = group_list(child)?;
            }
            "edit" => {
                site.policy.edit_mode = EditMode::parse_for("edit", &required_string(child, &site.id)?)?;
                site.policy.editor_groups = group_list(child)?;
            }
            "create-top-level" => {
                site.policy.create_top_level_mode =
                    EditMode::parse_for("create-top-level", &required_string(child, &site.id)?)?;
                site.policy.creator_groups = group_list(child)?;
            }
            other => {
                return Err(AccessError::InvalidPolicy(format!(
                    "unexpected child `{other}` in site `{}` (expected `title`, `tagline`, `theme`, `view`, `edit` or `create-top-level`)",
                    site.id
                )));
            }
        }
    }

    Ok(site)
}

fn required_string(node: &KdlNode, site: &str) -> Result<String, AccessError> {
    first_string_arg(node).ok_or_else(|| {
        AccessError::InvalidPolicy(format!(
            "`{}` in site `{site}` requires a string argument",
            node.name().value()
        ))
    })
}

fn group_list(node: &KdlNode) -> Result<BTreeSet<GroupId>, AccessError> {
    Ok(dash_list(node)?.into_iter().map(GroupId).collect())
}

/// Extract the first string argument from a KDL node.
fn first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

/// Extract dash-list children: nodes named "-" with a string argument.
/// Any other child, or a `-` entry without a string, is rejected.
/// Example KDL:
/// ```kdl
/// groups {
///     - "editors"
///     - "writers"
/// }
/// ```
fn dash_list(node: &KdlNode) -> Result<Vec<String>, AccessError> {
    let Some(children) = node.children() else {
        return Ok(Vec::new());
    };
    let list = node.name().value();
    children
        .nodes()
        .iter()
        .map(|n| {
            if n.name().value() != "-" {
                return Err(AccessError::InvalidPolicy(format!(
                    "unexpected entry `{}` in `{list}` list (expected `- \"<name>\"`)",
                    n.name().value()
                )));
            }
            first_string_arg(n).ok_or_else(|| {
                AccessError::InvalidPolicy(format!(
                    "entry in `{list}` list requires a string argument (e.g. - \"editors\")"
                ))
            })
        })
        .collect()
}
