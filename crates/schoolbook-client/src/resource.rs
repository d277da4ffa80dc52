//! # Resource Services
//!
//! The CRUD endpoints shared by every resource:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list      | `GET {path}/getall` |
//! | get       | `GET {path}/{id}` |
//! | create    | `POST {path}/create` |
//! | update    | `PUT {path}/update/{id}` |
//! | delete    | `DELETE {path}/delete/{id}` |
//! | export    | `GET {path}/export` (Excel blob, exportable resources only) |

use crate::{Envelope, Error, SchoolClient};
use schoolbook_core::{Class, ClassId, Student, StudentId, Subject, SubjectId, Teacher, TeacherId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::marker::PhantomData;

/// A record type served by one REST resource.
pub trait ApiResource: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Typed id used in `/{id}` paths.
    type Id: Display + Copy + Send;

    /// Resource root, e.g. `/student`.
    const PATH: &'static str;

    /// Name used in logs.
    const SERVICE: &'static str;

    /// Server id, once created.
    fn id(&self) -> Option<Self::Id>;
}

/// Resources with a `GET {path}/export` endpoint.
pub trait Exportable: ApiResource {
    /// File name prefix for saved exports.
    const EXPORT_PREFIX: &'static str;
}

impl ApiResource for Student {
    type Id = StudentId;
    const PATH: &'static str = "/student";
    const SERVICE: &'static str = "StudentService";

    fn id(&self) -> Option<StudentId> {
        self.student_id
    }
}

impl Exportable for Student {
    const EXPORT_PREFIX: &'static str = "students_export";
}

impl ApiResource for Teacher {
    type Id = TeacherId;
    const PATH: &'static str = "/teacher";
    const SERVICE: &'static str = "TeacherService";

    fn id(&self) -> Option<TeacherId> {
        self.teacher_id
    }
}

impl ApiResource for Subject {
    type Id = SubjectId;
    const PATH: &'static str = "/subject";
    const SERVICE: &'static str = "SubjectService";

    fn id(&self) -> Option<SubjectId> {
        self.subject_id
    }
}

impl Exportable for Subject {
    const EXPORT_PREFIX: &'static str = "subjects_export";
}

impl ApiResource for Class {
    type Id = ClassId;
    const PATH: &'static str = "/class";
    const SERVICE: &'static str = "ClassService";

    fn id(&self) -> Option<ClassId> {
        self.class_id
    }
}

impl Exportable for Class {
    const EXPORT_PREFIX: &'static str = "classes_export";
}

/// CRUD access to one resource.
#[derive(Debug)]
pub struct ResourceApi<'a, R> {
    pub(crate) client: &'a SchoolClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for ResourceApi<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for ResourceApi<'_, R> {}

impl<'a, R: ApiResource> ResourceApi<'a, R> {
    pub(crate) fn new(client: &'a SchoolClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    /// Every record.
    pub async fn list(&self) -> Result<Vec<R>, Error> {
        let path = format!("{}/getall", R::PATH);
        let env: Envelope<Vec<R>> = self.client.envelope(R::SERVICE, self.client.get(&path)).await?;
        Ok(env.into_list())
    }

    /// One record by id.
    pub async fn get(&self, id: R::Id) -> Result<R, Error> {
        let path = format!("{}/{}", R::PATH, id);
        let env: Envelope<R> = self.client.envelope(R::SERVICE, self.client.get(&path)).await?;
        env.into_data()
    }

    /// Create a record; returns it as stored by the server.
    pub async fn create(&self, record: &R) -> Result<R, Error> {
        let path = format!("{}/create", R::PATH);
        let req = self.client.post(&path).json(record);
        let env: Envelope<R> = self.client.envelope(R::SERVICE, req).await?;
        env.into_data()
    }

    /// Replace a record; returns it as stored by the server.
    pub async fn update(&self, id: R::Id, record: &R) -> Result<R, Error> {
        let path = format!("{}/update/{}", R::PATH, id);
        let req = self.client.put(&path).json(record);
        let env: Envelope<R> = self.client.envelope(R::SERVICE, req).await?;
        env.into_data()
    }

    /// Delete a record; returns the backend's confirmation message.
    pub async fn delete(&self, id: R::Id) -> Result<Option<String>, Error> {
        let path = format!("{}/delete/{}", R::PATH, id);
        let env: Envelope<serde_json::Value> =
            self.client.envelope(R::SERVICE, self.client.delete(&path)).await?;
        Ok(env.message)
    }
}

impl<R: Exportable> ResourceApi<'_, R> {
    /// Download the Excel export as raw bytes.
    pub async fn export(&self) -> Result<Vec<u8>, Error> {
        let path = format!("{}/export", R::PATH);
        self.client.blob(R::SERVICE, self.client.get(&path)).await
    }
}
