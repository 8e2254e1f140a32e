//! In-memory media store for tests
//!
//! Uploads succeed unless a failure has been scripted with
//! [`MockMediaStore::push_upload_failure`]; every call is recorded so tests can
//! assert on exactly what reached the remote store.

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::traits::{
    BATCH_DELETE_LIMIT, CredentialFingerprint, MediaStore, ResourcePage, StorageError, StorageResult,
    UploadDescriptor, UploadSignature, LIST_PAGE_SIZE,
};
use crate::StorageBackend;

#[derive(Default)]
struct MockState {
    objects: BTreeSet<String>,
    upload_failures: VecDeque<StorageError>,
    destroy_failure: Option<String>,
    list_failure: Option<String>,
    ping_failure: Option<StorageError>,
    upload_attempts: usize,
    uploaded: Vec<UploadDescriptor>,
    destroyed: Vec<String>,
    list_calls: usize,
    batch_deletes: Vec<Vec<String>>,
    deleted_folders: Vec<String>,
    next_id: usize,
}

/// Mock media store for testing without a remote service
#[derive(Clone, Default)]
pub struct MockMediaStore {
    state: Arc<Mutex<MockState>>,
}

impl MockMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next upload attempt with `err`; queued failures are consumed in order.
    pub fn push_upload_failure(&self, err: StorageError) {
        self.state.lock().unwrap().upload_failures.push_back(err);
    }

    /// Make every `destroy` call fail.
    pub fn fail_destroy(&self, message: &str) {
        self.state.lock().unwrap().destroy_failure = Some(message.to_string());
    }

    /// Make every `list_by_prefix` call fail, simulating an outage.
    pub fn fail_listing(&self, message: &str) {
        self.state.lock().unwrap().list_failure = Some(message.to_string());
    }

    pub fn fail_ping(&self, err: StorageError) {
        self.state.lock().unwrap().ping_failure = Some(err);
    }

    /// Pretend an object already exists remotely.
    pub fn seed_object(&self, public_id: &str) {
        self.state
            .lock()
            .unwrap()
            .objects
            .insert(public_id.to_string());
    }

    pub fn upload_attempts(&self) -> usize {
        self.state.lock().unwrap().upload_attempts
    }

    pub fn uploaded(&self) -> Vec<UploadDescriptor> {
        self.state.lock().unwrap().uploaded.clone()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.state.lock().unwrap().destroyed.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn batch_deletes(&self) -> Vec<Vec<String>> {
        self.state.lock().unwrap().batch_deletes.clone()
    }

    pub fn deleted_folders(&self) -> Vec<String> {
        self.state.lock().unwrap().deleted_folders.clone()
    }

    /// Objects currently held by the store
    pub fn objects(&self) -> Vec<String> {
        self.state.lock().unwrap().objects.iter().cloned().collect()
    }

    /// Total number of calls of any kind that reached the store
    pub fn total_calls(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.upload_attempts
            + state.destroyed.len()
            + state.list_calls
            + state.batch_deletes.len()
            + state.deleted_folders.len()
    }
}

#[async_trait]
impl MediaStore for MockMediaStore {
    async fn upload(&self, data: Vec<u8>, folder: &str) -> StorageResult<UploadDescriptor> {
        let mut state = self.state.lock().unwrap();
        state.upload_attempts += 1;

        if let Some(err) = state.upload_failures.pop_front() {
            return Err(err);
        }

        state.next_id += 1;
        let public_id = format!("{}/mock-{}", folder, state.next_id);
        let descriptor = UploadDescriptor {
            url: format!("https://res.mock.test/{}.png", public_id),
            public_id: public_id.clone(),
            width: Some(1),
            height: Some(1),
            format: Some("png".to_string()),
            bytes: data.len() as i64,
            resource_type: "image".to_string(),
            folder: folder.to_string(),
        };
        state.objects.insert(public_id);
        state.uploaded.push(descriptor.clone());
        Ok(descriptor)
    }

    async fn destroy(&self, public_id: &str) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        state.destroyed.push(public_id.to_string());
        if let Some(message) = &state.destroy_failure {
            return Err(StorageError::Network(message.clone()));
        }
        state.objects.remove(public_id);
        Ok(())
    }

    async fn list_by_prefix(
        &self,
        prefix: &str,
        cursor: Option<&str>,
    ) -> StorageResult<ResourcePage> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        if let Some(message) = &state.list_failure {
            return Err(StorageError::Network(message.clone()));
        }

        let matching: Vec<String> = state
            .objects
            .iter()
            .filter(|id| id.starts_with(prefix))
            .cloned()
            .collect();
        let offset = cursor.and_then(|c| c.parse::<usize>().ok()).unwrap_or(0);
        let end = (offset + LIST_PAGE_SIZE).min(matching.len());

        Ok(ResourcePage {
            public_ids: matching.get(offset..end).map(<[String]>::to_vec).unwrap_or_default(),
            next_cursor: (end < matching.len()).then(|| end.to_string()),
        })
    }

    async fn batch_delete(&self, public_ids: &[String]) -> StorageResult<()> {
        if public_ids.len() > BATCH_DELETE_LIMIT {
            return Err(StorageError::InvalidKey(format!(
                "batch delete accepts at most {} ids",
                BATCH_DELETE_LIMIT
            )));
        }
        let mut state = self.state.lock().unwrap();
        state.batch_deletes.push(public_ids.to_vec());
        for id in public_ids {
            state.objects.remove(id);
        }
        Ok(())
    }

    async fn delete_folder(&self, path: &str) -> StorageResult<()> {
        self.state
            .lock()
            .unwrap()
            .deleted_folders
            .push(path.to_string());
        Ok(())
    }

    async fn ping(&self) -> StorageResult<()> {
        match self.state.lock().unwrap().ping_failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn sign_upload_params(
        &self,
        params: &BTreeMap<String, String>,
    ) -> StorageResult<UploadSignature> {
        let joined = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        Ok(UploadSignature {
            signature: format!("mock:{}", joined),
            signature_algorithm: "sha256",
            api_key: "mock-key".to_string(),
            cloud_name: "mock-cloud".to_string(),
        })
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Cloudinary
    }

    fn credential_fingerprint(&self) -> CredentialFingerprint {
        CredentialFingerprint {
            cloud_name_last4: Some("****loud".to_string()),
            api_key_last4: Some("****-key".to_string()),
            have_secret: true,
        }
    }
}
