//! Relationship graph operations.
//!
//! # Responsibility
//! - Link/unlink parents and children, enroll/unenroll students, assign
//!   tutors.
//! - Cascade deletes and identity edits across every edge of an entity.
//!
//! # Invariants
//! - Each operation checks every precondition before writing either end of
//!   an edge; both ends are then written in the same call.
//! - Parent linking is idempotent; enrolling twice is a duplicate error.
//! - Deleting a tutor unassigns their classes, it never deletes them.
//! - A student leaving the graph (delete or role change) also leaves every
//!   session ledger; plain unenrollment keeps ledger history.

use crate::book::error::{BookError, BookResult};
use crate::book::AddressBook;
use crate::model::name::{ClassName, PersonName};
use crate::model::person::{Person, PersonId, PersonProfile, Role};
use crate::model::tuition_class::TuitionClass;

impl AddressBook {
    /// Links a parent and a student. Linking an existing pair is a no-op.
    pub fn link_parent_child(&mut self, parent: &PersonName, child: &PersonName) -> BookResult<()> {
        let parent_id = self.require_role(parent, Role::Parent)?.id();
        let child = self.require_role(child, Role::Student)?;
        let child_id = child.id();
        if child.parents().contains(&parent_id) {
            return Ok(());
        }

        self.persons.update_by_id(parent_id, |p| p.add_child(child_id));
        self.persons.update_by_id(child_id, |c| c.add_parent(parent_id));
        Ok(())
    }

    pub fn unlink_parent_child(
        &mut self,
        parent: &PersonName,
        child: &PersonName,
    ) -> BookResult<()> {
        let parent_id = self.require_role(parent, Role::Parent)?.id();
        let child_entity = self.require_role(child, Role::Student)?;
        let child_id = child_entity.id();
        if !child_entity.parents().contains(&parent_id) {
            return Err(BookError::NotLinked {
                parent: parent.clone(),
                child: child.clone(),
            });
        }

        self.persons
            .update_by_id(parent_id, |p| p.remove_child(child_id));
        self.persons
            .update_by_id(child_id, |c| c.remove_parent(parent_id));
        Ok(())
    }

    /// Puts a student on a class roster.
    ///
    /// Existing sessions keep their ledgers; see `reinitialize_attendance`.
    pub fn enroll_student(&mut self, student: &PersonName, class: &ClassName) -> BookResult<()> {
        let student_id = self.require_role(student, Role::Student)?.id();
        let class_entity = self.require_class(class)?;
        let class_id = class_entity.id();
        if class_entity.has_student(student_id) {
            return Err(BookError::AlreadyEnrolled {
                student: student.clone(),
                class: class_entity.name().clone(),
            });
        }

        self.classes
            .update_by_id(class_id, |c| c.add_student(student_id));
        self.persons
            .update_by_id(student_id, |s| s.add_class(class_id));
        Ok(())
    }

    /// Takes a student off a class roster. Session ledgers keep their entries.
    pub fn unenroll_student(&mut self, student: &PersonName, class: &ClassName) -> BookResult<()> {
        let student_id = self.require_role(student, Role::Student)?.id();
        let class_entity = self.require_class(class)?;
        let class_id = class_entity.id();
        if !class_entity.has_student(student_id) {
            return Err(BookError::NotEnrolled {
                student: student.clone(),
                class: class_entity.name().clone(),
            });
        }

        self.classes
            .update_by_id(class_id, |c| c.remove_student(student_id));
        self.persons
            .update_by_id(student_id, |s| s.remove_class(class_id));
        Ok(())
    }

    /// Makes `tutor` the tutor of `class`, replacing any previous tutor.
    pub fn assign_tutor(&mut self, tutor: &PersonName, class: &ClassName) -> BookResult<()> {
        let tutor_id = self.require_role(tutor, Role::Tutor)?.id();
        let class_entity = self.require_class(class)?;
        let class_id = class_entity.id();
        let previous = class_entity.tutor();
        if previous == Some(tutor_id) {
            return Ok(());
        }

        if let Some(previous) = previous {
            self.persons
                .update_by_id(previous, |t| t.remove_class(class_id));
        }
        self.classes
            .update_by_id(class_id, |c| c.set_tutor(Some(tutor_id)));
        self.persons
            .update_by_id(tutor_id, |t| t.add_class(class_id));
        Ok(())
    }

    /// Leaves `class` without a tutor.
    pub fn unassign_tutor(&mut self, class: &ClassName) -> BookResult<()> {
        let class_entity = self.require_class(class)?;
        let class_id = class_entity.id();
        let tutor_id = class_entity
            .tutor()
            .ok_or_else(|| BookError::NoTutor(class_entity.name().clone()))?;

        self.classes.update_by_id(class_id, |c| c.set_tutor(None));
        self.persons
            .update_by_id(tutor_id, |t| t.remove_class(class_id));
        Ok(())
    }

    /// Removes a class after detaching it from its students and tutor.
    pub fn delete_class(&mut self, class: &ClassName) -> BookResult<TuitionClass> {
        let class_entity = self.require_class(class)?;
        let class_id = class_entity.id();
        let mut members = class_entity.students().to_vec();
        members.extend(class_entity.tutor());

        for member in members {
            self.persons
                .update_by_id(member, |p| p.remove_class(class_id));
        }
        Ok(self.classes.remove(class)?)
    }

    /// Removes a person after severing every edge that touches them.
    pub fn delete_person(&mut self, name: &PersonName) -> BookResult<Person> {
        let id = self
            .persons
            .get(name)
            .ok_or_else(|| BookError::PersonNotFound(name.clone()))?
            .id();
        self.detach_person(id);
        Ok(self.persons.remove(name)?)
    }

    /// Replaces the data of `target`.
    ///
    /// With an unchanged role the entity keeps its id and every edge. With a
    /// different role all edges are torn down and a fresh entity of the new
    /// role takes the same slot. Returns the id of the resulting entity.
    pub fn edit_person(
        &mut self,
        target: &PersonName,
        role: Role,
        profile: PersonProfile,
    ) -> BookResult<PersonId> {
        let existing = self
            .persons
            .get(target)
            .ok_or_else(|| BookError::PersonNotFound(target.clone()))?;
        if profile.name != *target && self.persons.contains(&profile.name) {
            return Err(BookError::DuplicatePerson(profile.name));
        }

        if existing.role() == role {
            let mut edited = existing.clone();
            edited.set_profile(profile);
            let id = edited.id();
            self.persons.set(target, edited)?;
            return Ok(id);
        }

        let id = existing.id();
        self.detach_person(id);
        let replacement = Person::new(role, profile);
        let replacement_id = replacement.id();
        self.persons.set(target, replacement)?;
        Ok(replacement_id)
    }

    /// Renames a class. Re-casing the same name is allowed.
    pub fn rename_class(&mut self, target: &ClassName, new_name: ClassName) -> BookResult<()> {
        let existing = self.require_class(target)?;
        if new_name != *target && self.classes.contains(&new_name) {
            return Err(BookError::DuplicateClass(new_name));
        }

        let mut edited = existing.clone();
        edited.set_name(new_name);
        self.classes.set(target, edited)?;
        Ok(())
    }

    /// Severs every edge of a person, on both ends. The person stays listed.
    fn detach_person(&mut self, id: PersonId) {
        let Some(person) = self.persons.get_by_id(id) else {
            return;
        };
        let parents = person.parents().to_vec();
        let children = person.children().to_vec();
        let classes = person.classes().to_vec();

        match person.role() {
            Role::Student => {
                for parent in &parents {
                    self.persons.update_by_id(*parent, |p| p.remove_child(id));
                }
                for class in &classes {
                    self.classes.update_by_id(*class, |c| c.remove_student(id));
                }
                let attended = self
                    .classes
                    .iter()
                    .filter(|c| c.sessions().iter().any(|s| s.attendance().contains(id)))
                    .map(|c| c.id())
                    .collect::<Vec<_>>();
                for class in attended {
                    self.classes
                        .update_by_id(class, |c| c.forget_attendance(id));
                }
            }
            Role::Parent => {
                for child in &children {
                    self.persons.update_by_id(*child, |c| c.remove_parent(id));
                }
            }
            Role::Tutor => {
                for class in &classes {
                    self.classes.update_by_id(*class, |c| {
                        if c.tutor() == Some(id) {
                            c.set_tutor(None);
                        }
                    });
                }
            }
        }

        if parents.is_empty() && children.is_empty() && classes.is_empty() {
            return;
        }
        self.persons.update_by_id(id, |p| {
            for parent in &parents {
                p.remove_parent(*parent);
            }
            for child in &children {
                p.remove_child(*child);
            }
            for class in &classes {
                p.remove_class(*class);
            }
        });
    }
}
