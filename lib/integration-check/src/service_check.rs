use std::str::FromStr;

use super::Tags;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Status {
    Ok = 0,
    Warning,
    Critical,
    Unknown,
}

impl FromStr for Status {
    type Err = String;

    /// Parses a status name, case insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ok" => Ok(Self::Ok),
            "warning" => Ok(Self::Warning),
            "critical" => Ok(Self::Critical),
            "unknown" => Ok(Self::Unknown),
            other => Err(format!("invalid service check status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceCheck {
    pub name: String,
    pub status: Status,
    pub tags: Tags,
    pub hostname: Option<String>,
    pub message: String,
}

impl ServiceCheck {
    pub fn new(name: impl Into<String>, status: Status, tags: Tags) -> Self {
        Self {
            name: name.into(),
            status,
            tags,
            hostname: None,
            message: String::new(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_hostname(mut self, hostname: Option<String>) -> Self {
        self.hostname = hostname;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_names() {
        assert_eq!("OK".parse::<Status>(), Ok(Status::Ok));
        assert_eq!("critical".parse::<Status>(), Ok(Status::Critical));
        assert!("broken".parse::<Status>().is_err());
        assert_eq!(Status::Unknown as i32, 3);
    }
}
