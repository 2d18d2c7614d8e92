//! The roster operations
//!
//! `Roster` runs registration, common-students, suspension and
//! notification-recipient resolution over any `Store`.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::email::Email;
use crate::error::{Result, RosterError, StoreError};
use crate::mentions::parse_mentions;
use crate::store::Store;

/// Roster service, cheap to clone
#[derive(Clone)]
pub struct Roster {
    store: Arc<dyn Store>,
}

impl Roster {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Check that the store answers.
    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await?;
        Ok(())
    }

    /// Register students under a teacher.
    ///
    /// Creates the teacher and any unknown students. Fails with
    /// `AlreadyRegistered` naming every student already associated with the
    /// teacher, in which case no student is created or associated.
    #[instrument(name = "register_students", skip_all, fields(teacher = %teacher, count = students.len()))]
    pub async fn register_students(&self, teacher: &Email, students: &[Email]) -> Result<()> {
        let teacher = self.store.find_or_create_teacher(teacher.as_str()).await?;

        let mut seen = HashSet::new();
        let students: Vec<&Email> = students.iter().filter(|s| seen.insert(*s)).collect();

        let conflicts = self.registered_among(teacher.id, &students).await?;
        if !conflicts.is_empty() {
            info!(?conflicts, "students already registered");
            return Err(RosterError::AlreadyRegistered { emails: conflicts });
        }

        let mut student_ids = Vec::with_capacity(students.len());
        for email in &students {
            let student = self.store.find_or_create_student(email.as_str()).await?;
            student_ids.push(student.id);
        }

        match self.store.add_associations(teacher.id, &student_ids).await {
            Ok(()) => {
                info!("students registered");
                Ok(())
            }
            Err(StoreError::Conflict { what }) => {
                // a concurrent registration got there first
                warn!(%what, "association conflict during registration");
                let conflicts = self.registered_among(teacher.id, &students).await?;
                if conflicts.is_empty() {
                    Err(StoreError::Conflict { what }.into())
                } else {
                    Err(RosterError::AlreadyRegistered { emails: conflicts })
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Emails (in input order) of existing students already associated with
    /// the teacher.
    async fn registered_among(&self, teacher_id: i64, students: &[&Email]) -> Result<Vec<String>> {
        let mut registered = Vec::new();
        for email in students {
            let Some(student) = self.store.find_student(email.as_str()).await? else {
                continue;
            };
            if self.store.has_association(teacher_id, student.id).await? {
                registered.push(email.to_string());
            }
        }
        Ok(registered)
    }

    /// Emails of active students associated with every listed teacher.
    ///
    /// Fails with `TeacherNotFound` naming every unknown teacher. Order of
    /// the result is unspecified.
    #[instrument(name = "common_students", skip_all, fields(teachers = teachers.len()))]
    pub async fn common_students(&self, teachers: &[Email]) -> Result<Vec<String>> {
        let mut teacher_ids = Vec::with_capacity(teachers.len());
        let mut missing = Vec::new();
        for email in teachers {
            match self.store.find_teacher(email.as_str()).await? {
                Some(teacher) if teacher.is_active => {
                    if !teacher_ids.contains(&teacher.id) {
                        teacher_ids.push(teacher.id);
                    }
                }
                _ => missing.push(email.to_string()),
            }
        }
        if !missing.is_empty() {
            info!(?missing, "unknown teachers");
            return Err(RosterError::TeacherNotFound { emails: missing });
        }

        let common: Vec<String> = self
            .store
            .common_active_students(&teacher_ids)
            .await?
            .into_iter()
            .map(|s| s.email)
            .collect();

        debug!(found = common.len(), "common students resolved");
        Ok(common)
    }

    /// Suspend a student.
    ///
    /// Suspending an already suspended student succeeds; only an unknown
    /// email fails, with `StudentNotFound`.
    #[instrument(name = "suspend_student", skip_all, fields(student = %email))]
    pub async fn suspend_student(&self, email: &Email) -> Result<()> {
        let student = self
            .store
            .find_student(email.as_str())
            .await?
            .ok_or_else(|| RosterError::StudentNotFound {
                email: email.to_string(),
            })?;

        if !student.is_active {
            debug!("student already suspended");
        }
        self.store.set_student_active(student.id, false).await?;
        info!("student suspended");
        Ok(())
    }

    /// Recipients of a notification sent by `teacher`.
    ///
    /// The teacher's active students, followed by every mentioned email that
    /// resolves to an active student, without duplicates. Mentions of unknown
    /// or suspended students are dropped silently.
    #[instrument(name = "notification_recipients", skip_all, fields(teacher = %teacher))]
    pub async fn notification_recipients(
        &self,
        teacher: &Email,
        notification: &str,
    ) -> Result<Vec<String>> {
        let teacher = match self.store.find_teacher(teacher.as_str()).await? {
            Some(t) if t.is_active => t,
            _ => {
                return Err(RosterError::SenderNotFound {
                    email: teacher.to_string(),
                })
            }
        };

        let mut recipients = Vec::new();
        let mut seen = HashSet::new();
        for student in self.store.active_students_of(teacher.id).await? {
            if seen.insert(student.email.clone()) {
                recipients.push(student.email);
            }
        }

        let mentions = parse_mentions(notification);
        debug!(own = recipients.len(), mentions = mentions.len(), "resolving mentions");
        for mention in mentions {
            if seen.contains(&mention) {
                continue;
            }
            match self.store.find_student(&mention).await? {
                Some(student) if student.is_active => {
                    seen.insert(mention.clone());
                    recipients.push(mention);
                }
                _ => debug!(%mention, "dropping mention"),
            }
        }

        Ok(recipients)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Student, Teacher};
    use crate::store::MemoryStore;
    use std::collections::BTreeSet;

    fn email(s: &str) -> Email {
        Email::new(s).unwrap()
    }

    fn emails(list: &[&str]) -> Vec<Email> {
        list.iter().map(|s| email(s)).collect()
    }

    fn set(list: Vec<String>) -> BTreeSet<String> {
        list.into_iter().collect()
    }

    fn roster() -> Roster {
        Roster::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn register_then_common_round_trip() {
        let roster = roster();
        let ken = email("teacherken@gmail.com");
        roster
            .register_students(&ken, &emails(&["studentjon@gmail.com", "studenthon@gmail.com"]))
            .await
            .unwrap();

        let common = roster.common_students(&[ken]).await.unwrap();
        assert_eq!(
            set(common),
            BTreeSet::from(["studentjon@gmail.com".into(), "studenthon@gmail.com".into()])
        );
    }

    #[tokio::test]
    async fn register_is_all_or_nothing() {
        let roster = roster();
        let ken = email("teacherken@gmail.com");
        roster
            .register_students(&ken, &emails(&["s1@x.com"]))
            .await
            .unwrap();

        let err = roster
            .register_students(&ken, &emails(&["s2@x.com", "s1@x.com", "s3@x.com"]))
            .await
            .unwrap_err();
        match err {
            RosterError::AlreadyRegistered { emails } => assert_eq!(emails, ["s1@x.com"]),
            other => panic!("unexpected error: {other:?}"),
        }

        // neither s2 nor s3 was created
        assert!(roster.store().find_student("s2@x.com").await.unwrap().is_none());
        assert!(roster.store().find_student("s3@x.com").await.unwrap().is_none());
        let common = roster.common_students(&[ken]).await.unwrap();
        assert_eq!(common, ["s1@x.com"]);
    }

    #[tokio::test]
    async fn conflicts_reported_in_input_order() {
        let roster = roster();
        let ken = email("teacherken@gmail.com");
        roster
            .register_students(&ken, &emails(&["a@x.com", "b@x.com"]))
            .await
            .unwrap();

        let err = roster
            .register_students(&ken, &emails(&["b@x.com", "c@x.com", "a@x.com"]))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Student(s) \"b@x.com,a@x.com\" are already registered to the teacher"
        );
    }

    #[tokio::test]
    async fn existing_student_can_join_another_teacher() {
        let roster = roster();
        let ken = email("teacherken@gmail.com");
        let joe = email("teacherjoe@gmail.com");
        roster.register_students(&ken, &emails(&["s@x.com"])).await.unwrap();
        roster.register_students(&joe, &emails(&["s@x.com"])).await.unwrap();

        let common = roster.common_students(&[ken, joe]).await.unwrap();
        assert_eq!(common, ["s@x.com"]);
    }

    #[tokio::test]
    async fn duplicate_emails_in_one_request_collapse() {
        let roster = roster();
        let ken = email("teacherken@gmail.com");
        roster
            .register_students(&ken, &emails(&["s@x.com", "s@x.com"]))
            .await
            .unwrap();
        assert_eq!(roster.common_students(&[ken]).await.unwrap(), ["s@x.com"]);
    }

    #[tokio::test]
    async fn common_students_is_an_intersection() {
        let roster = roster();
        let t1 = email("t1@x.com");
        let t2 = email("t2@x.com");
        roster
            .register_students(&t1, &emails(&["s1@x.com", "s2@x.com"]))
            .await
            .unwrap();
        roster.register_students(&t2, &emails(&["s2@x.com"])).await.unwrap();

        let common = roster.common_students(&[t1.clone(), t2]).await.unwrap();
        assert_eq!(common, ["s2@x.com"]);

        let single = roster.common_students(&[t1]).await.unwrap();
        assert_eq!(
            set(single),
            BTreeSet::from(["s1@x.com".into(), "s2@x.com".into()])
        );
    }

    #[tokio::test]
    async fn common_students_names_only_unknown_teachers() {
        let roster = roster();
        let known = email("t1@x.com");
        roster.register_students(&known, &emails(&["s@x.com"])).await.unwrap();

        let err = roster
            .common_students(&emails(&["ghost1@x.com", "t1@x.com", "ghost2@x.com"]))
            .await
            .unwrap_err();
        match err {
            RosterError::TeacherNotFound { emails } => {
                assert_eq!(emails, ["ghost1@x.com", "ghost2@x.com"])
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn suspended_students_vanish_from_reads() {
        let roster = roster();
        let ken = email("teacherken@gmail.com");
        roster
            .register_students(&ken, &emails(&["s1@x.com", "s2@x.com"]))
            .await
            .unwrap();
        roster.suspend_student(&email("s2@x.com")).await.unwrap();

        assert_eq!(roster.common_students(&[ken.clone()]).await.unwrap(), ["s1@x.com"]);
        let recipients = roster
            .notification_recipients(&ken, "hi @s2@x.com")
            .await
            .unwrap();
        assert_eq!(recipients, ["s1@x.com"]);

        let stored = roster.store().find_student("s2@x.com").await.unwrap().unwrap();
        assert!(!stored.is_active);
    }

    #[tokio::test]
    async fn suspend_twice_succeeds() {
        let roster = roster();
        roster
            .register_students(&email("t@x.com"), &emails(&["s@x.com"]))
            .await
            .unwrap();
        roster.suspend_student(&email("s@x.com")).await.unwrap();
        roster.suspend_student(&email("s@x.com")).await.unwrap();
    }

    #[tokio::test]
    async fn suspend_unknown_student() {
        let err = roster().suspend_student(&email("nobody@x.com")).await.unwrap_err();
        assert!(matches!(err, RosterError::StudentNotFound { .. }));
        assert_eq!(err.to_string(), "Student with this email does not exist");
    }

    #[tokio::test]
    async fn recipients_drop_unregistered_and_dedupe() {
        let roster = roster();
        let ken = email("teacherken@gmail.com");
        roster.register_students(&ken, &emails(&["s1@x.com"])).await.unwrap();

        let recipients = roster
            .notification_recipients(&ken, "Hello @s1@x.com @s2@x.com")
            .await
            .unwrap();
        assert_eq!(recipients, ["s1@x.com"]);
    }

    #[tokio::test]
    async fn recipients_include_other_teachers_students() {
        let roster = roster();
        let ken = email("teacherken@gmail.com");
        let joe = email("teacherjoe@gmail.com");
        roster.register_students(&ken, &emails(&["own@x.com"])).await.unwrap();
        roster
            .register_students(&joe, &emails(&["agnes@x.com", "miche@x.com"]))
            .await
            .unwrap();

        let recipients = roster
            .notification_recipients(&ken, "Hey @agnes@x.com @miche@x.com @agnes@x.com @notanemail")
            .await
            .unwrap();
        assert_eq!(recipients, ["own@x.com", "agnes@x.com", "miche@x.com"]);
    }

    #[tokio::test]
    async fn recipients_without_mentions() {
        let roster = roster();
        let ken = email("teacherken@gmail.com");
        roster
            .register_students(&ken, &emails(&["a@x.com", "b@x.com"]))
            .await
            .unwrap();
        let recipients = roster.notification_recipients(&ken, "Hey everybody").await.unwrap();
        assert_eq!(
            set(recipients),
            BTreeSet::from(["a@x.com".into(), "b@x.com".into()])
        );
    }

    #[tokio::test]
    async fn recipients_for_unknown_teacher() {
        let err = roster()
            .notification_recipients(&email("ghost@x.com"), "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::SenderNotFound { .. }));
        assert_eq!(err.to_string(), "Teacher with this email does not exist");
    }

    type StoreResult<T> = std::result::Result<T, StoreError>;

    /// How the other registration behaves in `RacingStore`
    enum Race {
        /// Associates this student with the teacher just before our batch
        RivalWins(&'static str),
        /// Reports a conflict without writing anything
        PhantomConflict,
    }

    /// Memory store whose association batch loses a race
    struct RacingStore {
        inner: MemoryStore,
        race: Race,
    }

    #[async_trait::async_trait]
    impl Store for RacingStore {
        async fn find_teacher(&self, email: &str) -> StoreResult<Option<Teacher>> {
            self.inner.find_teacher(email).await
        }
        async fn find_student(&self, email: &str) -> StoreResult<Option<Student>> {
            self.inner.find_student(email).await
        }
        async fn find_or_create_teacher(&self, email: &str) -> StoreResult<Teacher> {
            self.inner.find_or_create_teacher(email).await
        }
        async fn find_or_create_student(&self, email: &str) -> StoreResult<Student> {
            self.inner.find_or_create_student(email).await
        }
        async fn set_student_active(&self, id: i64, active: bool) -> StoreResult<()> {
            self.inner.set_student_active(id, active).await
        }
        async fn has_association(&self, t: i64, s: i64) -> StoreResult<bool> {
            self.inner.has_association(t, s).await
        }
        async fn add_associations(&self, t: i64, ids: &[i64]) -> StoreResult<()> {
            match self.race {
                Race::RivalWins(rival) => {
                    let student = self.inner.find_or_create_student(rival).await?;
                    self.inner.add_associations(t, &[student.id]).await?;
                    self.inner.add_associations(t, ids).await
                }
                Race::PhantomConflict => Err(StoreError::conflict("teacher_students_pkey")),
            }
        }
        async fn active_students_of(&self, t: i64) -> StoreResult<Vec<Student>> {
            self.inner.active_students_of(t).await
        }
        async fn common_active_students(&self, ids: &[i64]) -> StoreResult<Vec<Student>> {
            self.inner.common_active_students(ids).await
        }
        async fn ping(&self) -> StoreResult<()> {
            self.inner.ping().await
        }
    }

    fn racing(race: Race) -> Roster {
        Roster::new(Arc::new(RacingStore {
            inner: MemoryStore::new(),
            race,
        }))
    }

    #[tokio::test]
    async fn lost_race_reports_already_registered() {
        let roster = racing(Race::RivalWins("b@x.com"));
        let ken = email("teacherken@gmail.com");

        let err = roster
            .register_students(&ken, &emails(&["a@x.com", "b@x.com"]))
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::AlreadyRegistered { .. }));
        assert_eq!(
            err.to_string(),
            "Student(s) \"b@x.com\" are already registered to the teacher"
        );

        // only the rival's association landed
        assert_eq!(roster.common_students(&[ken]).await.unwrap(), ["b@x.com"]);
    }

    #[tokio::test]
    async fn conflict_without_association_is_a_server_fault() {
        let roster = racing(Race::PhantomConflict);
        let err = roster
            .register_students(&email("t@x.com"), &emails(&["a@x.com"]))
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::Store(StoreError::Conflict { .. })));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn ping_reaches_store() {
        roster().ping().await.unwrap();
    }
}
