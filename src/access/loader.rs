use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::access::directory::MemberDirectory;
use crate::access::errors::AccessError;
use crate::access::policy::parse_kdl_document;
use crate::access::types::*;
use crate::access::AccessState;
use crate::site::SiteConfig;

/// Load all `.kdl` policy files from the given directory and compile them
/// into a single immutable `AccessState`.
pub fn load_policies(dir: &Path) -> Result<AccessState, AccessError> {
    if !dir.is_dir() {
        return Err(AccessError::InvalidPolicy(format!(
            "policies directory `{}` does not exist or is not a directory",
            dir.display()
        )));
    }

    let mut all_parsed = Vec::new();
    let mut file_count = 0;

    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .map(|ext| ext == "kdl")
                .unwrap_or(false)
        })
        .collect();
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();
        let contents =
            std::fs::read_to_string(&path).map_err(|source| AccessError::PolicyLoadError {
                path: path.display().to_string(),
                source,
            })?;
        let parsed = parse_kdl_document(&contents)?;
        all_parsed.push(parsed);
        file_count += 1;
    }

    let state = compile_policies(all_parsed)?;

    tracing::info!(
        files = file_count,
        sites = state.sites.len(),
        groups = state.directory.group_count(),
        members = state.directory.member_count(),
        "Loaded access policies"
    );

    Ok(state)
}

/// Merge and validate all parsed policies into a single `AccessState`.
pub fn compile_policies(parsed: Vec<ParsedPolicy>) -> Result<AccessState, AccessError> {
    let mut sites: HashMap<String, SiteConfig> = HashMap::new();
    let mut groups: HashMap<GroupId, GroupDef> = HashMap::new();
    let mut members: HashMap<MemberId, MemberDef> = HashMap::new();

    for p in parsed {
        for site in p.sites {
            if sites.contains_key(&site.id) {
                return Err(AccessError::DuplicateSite(site.id));
            }
            sites.insert(site.id.clone(), site);
        }
        // Later declarations of a group or member replace earlier ones
        for group in p.groups {
            groups.insert(group.id.clone(), group);
        }
        for member in p.members {
            members.insert(member.id.clone(), member);
        }
    }

    let declared: HashSet<&GroupId> = groups.keys().collect();
    for site in sites.values() {
        check_groups_declared(site.policy.referenced_groups(), &declared)?;
    }
    for member in members.values() {
        check_groups_declared(member.groups.iter(), &declared)?;
    }

    Ok(AccessState {
        sites,
        directory: MemberDirectory::new(groups.into_values().collect(), members.into_values().collect()),
    })
}

fn check_groups_declared<'a>(
    referenced: impl Iterator<Item = &'a GroupId>,
    declared: &HashSet<&GroupId>,
) -> Result<(), AccessError> {
    for group in referenced {
        if !declared.contains(group) {
            return Err(AccessError::UndefinedGroup(group.to_string()));
        }
    }
    Ok(())
}
