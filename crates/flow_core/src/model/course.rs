use serde::{Deserialize, Serialize};

/// Reference data; tasks point at courses by name only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub color: String,
}

impl Course {
    pub fn new<I, N, C>(id: I, name: N, color: C) -> Self
    where
        I: Into<String>,
        N: Into<String>,
        C: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
        }
    }
}

pub fn find_course<'a>(courses: &'a [Course], name: &str) -> Option<&'a Course> {
    courses.iter().find(|course| course.name == name)
}
