use serde::{Deserialize, Serialize};

/// The closed, ordered set of team members. Fixed for the lifetime of the
/// process; every attendance operation validates members against it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    members: Vec<String>,
}

impl Roster {
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = Vec::new();
        for member in members {
            let member = member.into();
            if !seen.contains(&member) {
                seen.push(member);
            }
        }
        if seen.is_empty() {
            panic!("Roster requires at least one member");
        }
        Self { members: seen }
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    pub fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|member| member == name)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(String::as_str)
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::new(["Saurabh", "Dhruv", "Divyansh", "Suraj", "Raja"])
    }
}
