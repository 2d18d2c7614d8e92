//! Request schemas and their validators
//!
//! Every schema deserializes leniently (all fields optional) and is then
//! checked by a pure `validate` that either yields the typed input or the
//! full list of field-level problems.

use std::fmt;

use serde::Deserialize;
use utoipa::ToSchema;

use crate::email::Email;

/// What is wrong with a single field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Problem {
    /// Field absent or null
    Missing,

    /// String or list is empty
    Empty,

    /// Field exceeds maximum length
    TooLong { max: usize },

    /// Value doesn't match the required format
    InvalidFormat { reason: &'static str },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("is required"),
            Self::Empty => f.write_str("cannot be empty"),
            Self::TooLong { max } => write!(f, "exceeds maximum length of {} characters", max),
            Self::InvalidFormat { reason } => f.write_str(reason),
        }
    }
}

/// A problem attached to the field it was found in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProblem {
    /// Field path, e.g. `teacher` or `students[2]`
    pub field: String,
    pub problem: Problem,
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.problem)
    }
}

/// Non-empty list of field problems from one request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid input: {}", join_problems(.problems))]
pub struct ValidationErrors {
    problems: Vec<FieldProblem>,
}

fn join_problems(problems: &[FieldProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn problems(&self) -> &[FieldProblem] {
        &self.problems
    }

    /// Whether any problem was recorded against `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.problems.iter().any(|p| p.field == field)
    }
}

/// Accumulates problems while a schema is checked
#[derive(Default)]
struct Checker {
    problems: Vec<FieldProblem>,
}

impl Checker {
    fn push(&mut self, field: impl Into<String>, problem: Problem) {
        self.problems.push(FieldProblem {
            field: field.into(),
            problem,
        });
    }

    fn email(&mut self, field: &str, value: Option<String>) -> Option<Email> {
        let Some(value) = value else {
            self.push(field, Problem::Missing);
            return None;
        };
        match Email::new(&value) {
            Ok(email) => Some(email),
            Err(problem) => {
                self.push(field, problem);
                None
            }
        }
    }

    fn email_list(&mut self, field: &str, values: Option<Vec<String>>) -> Vec<Email> {
        let Some(values) = values else {
            self.push(field, Problem::Missing);
            return Vec::new();
        };
        if values.is_empty() {
            self.push(field, Problem::Empty);
            return Vec::new();
        }

        let mut emails = Vec::with_capacity(values.len());
        for (i, value) in values.iter().enumerate() {
            match Email::new(value) {
                Ok(email) => emails.push(email),
                Err(problem) => self.push(format!("{}[{}]", field, i), problem),
            }
        }
        emails
    }

    fn finish(self) -> Result<(), ValidationErrors> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                problems: self.problems,
            })
        }
    }
}

/// Unwrap a field the checker already vouched for.
fn checked<T>(field: &'static str, value: Option<T>) -> Result<T, ValidationErrors> {
    value.ok_or_else(|| ValidationErrors {
        problems: vec![FieldProblem {
            field: field.to_owned(),
            problem: Problem::Missing,
        }],
    })
}

/// `POST /register` body
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RegisterInput {
    #[schema(example = "teacherken@gmail.com")]
    pub teacher: Option<String>,
    pub students: Option<Vec<String>>,
}

/// Validated registration
#[derive(Debug, Clone)]
pub struct Registration {
    pub teacher: Email,
    pub students: Vec<Email>,
}

impl RegisterInput {
    pub fn validate(self) -> Result<Registration, ValidationErrors> {
        let mut check = Checker::default();
        let teacher = check.email("teacher", self.teacher);
        let students = check.email_list("students", self.students);

        check.finish()?;
        Ok(Registration {
            teacher: checked("teacher", teacher)?,
            students,
        })
    }
}

/// `GET /commonstudents` query
#[derive(Debug, Clone, Default)]
pub struct CommonStudentsQuery {
    pub teacher: Vec<String>,
}

impl CommonStudentsQuery {
    /// Collect repeated `teacher` (or `teacher[]`) query pairs in order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let teacher = pairs
            .into_iter()
            .filter(|(key, _)| matches!(key.as_ref(), "teacher" | "teacher[]"))
            .map(|(_, value)| value.into())
            .collect();
        Self { teacher }
    }

    pub fn validate(self) -> Result<Vec<Email>, ValidationErrors> {
        let mut check = Checker::default();
        let teachers = check.email_list("teacher", Some(self.teacher));
        check.finish()?;
        Ok(teachers)
    }
}

/// `POST /suspend` body
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SuspendInput {
    #[schema(example = "studentmary@gmail.com")]
    pub student: Option<String>,
}

impl SuspendInput {
    pub fn validate(self) -> Result<Email, ValidationErrors> {
        let mut check = Checker::default();
        let student = check.email("student", self.student);
        check.finish()?;
        checked("student", student)
    }
}

/// `POST /retrievefornotifications` body
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NotificationInput {
    #[schema(example = "teacherken@gmail.com")]
    pub teacher: Option<String>,
    #[schema(example = "Hello students! @studentagnes@gmail.com @studentmiche@gmail.com")]
    pub notification: Option<String>,
}

/// Validated notification request
#[derive(Debug, Clone)]
pub struct Notification {
    pub teacher: Email,
    /// Free text; may be empty
    pub text: String,
}

impl NotificationInput {
    pub fn validate(self) -> Result<Notification, ValidationErrors> {
        let mut check = Checker::default();
        let teacher = check.email("teacher", self.teacher);
        if self.notification.is_none() {
            check.push("notification", Problem::Missing);
        }

        check.finish()?;
        Ok(Notification {
            teacher: checked("teacher", teacher)?,
            text: self.notification.unwrap_or_default(),
        })
    }
}
