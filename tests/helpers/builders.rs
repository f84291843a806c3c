use sitegate::access::loader::load_policies;
use sitegate::access::AccessState;
use tempfile::TempDir;

/// Builder for a `site` KDL node
pub struct SiteBuilder {
    id: String,
    body: Vec<String>,
}

impl SiteBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            body: Vec::new(),
        }
    }

    pub fn title(mut self, title: &str) -> Self {
        self.body.push(format!("title \"{title}\""));
        self
    }

    pub fn view(self, mode: &str, groups: &[&str]) -> Self {
        self.mode("view", mode, groups)
    }

    pub fn edit(self, mode: &str, groups: &[&str]) -> Self {
        self.mode("edit", mode, groups)
    }

    pub fn create_top_level(self, mode: &str, groups: &[&str]) -> Self {
        self.mode("create-top-level", mode, groups)
    }

    fn mode(mut self, node: &str, mode: &str, groups: &[&str]) -> Self {
        if groups.is_empty() {
            self.body.push(format!("{node} \"{mode}\""));
        } else {
            self.body
                .push(format!("{node} \"{mode}\" {{\n{}\n    }}", dash_lines(groups, 8)));
        }
        self
    }

    pub fn to_kdl(&self) -> String {
        let body: Vec<String> = self.body.iter().map(|l| format!("    {l}")).collect();
        format!("site \"{}\" {{\n{}\n}}\n", self.id, body.join("\n"))
    }
}

/// Builder for a `member` KDL node
pub struct MemberBuilder {
    id: String,
    groups: Vec<String>,
    admin: bool,
}

impl MemberBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            groups: Vec::new(),
            admin: false,
        }
    }

    pub fn in_groups(mut self, groups: &[&str]) -> Self {
        self.groups = groups.iter().map(|g| g.to_string()).collect();
        self
    }

    pub fn admin(mut self) -> Self {
        self.admin = true;
        self
    }

    pub fn to_kdl(&self) -> String {
        let mut body = Vec::new();
        if !self.groups.is_empty() {
            let groups: Vec<&str> = self.groups.iter().map(String::as_str).collect();
            body.push(format!("    groups {{\n{}\n    }}", dash_lines(&groups, 8)));
        }
        if self.admin {
            body.push("    admin".to_string());
        }
        format!("member \"{}\" {{\n{}\n}}\n", self.id, body.join("\n"))
    }
}

/// A temporary policies directory
pub struct PolicyDir {
    dir: TempDir,
}

impl PolicyDir {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp dir"),
        }
    }

    pub fn file(self, name: &str, contents: &str) -> Self {
        std::fs::write(self.dir.path().join(name), contents).expect("Failed to write policy file");
        self
    }

    /// Declare plain groups (no permission codes)
    pub fn groups(self, name: &str, groups: &[&str]) -> Self {
        let contents: String = groups.iter().map(|g| format!("group \"{g}\"\n")).collect();
        self.file(name, &contents)
    }

    pub fn site(self, name: &str, site: SiteBuilder) -> Self {
        self.file(name, &site.to_kdl())
    }

    pub fn members(self, name: &str, members: &[MemberBuilder]) -> Self {
        let contents: String = members.iter().map(MemberBuilder::to_kdl).collect();
        self.file(name, &contents)
    }

    pub fn load(&self) -> AccessState {
        load_policies(self.dir.path()).expect("Failed to load policies")
    }

    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }
}

fn dash_lines(items: &[&str], indent: usize) -> String {
    items
        .iter()
        .map(|i| format!("{}- \"{i}\"", " ".repeat(indent)))
        .collect::<Vec<_>>()
        .join("\n")
}
