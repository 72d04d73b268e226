//! State machine behaviour of `SearchController` against stub clients.
//!
//! The stub counts calls, records the names it was asked for, and can hold a
//! lookup open on a `Notify` gate so tests decide when (and in which order)
//! lookups resolve.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pokemon_search_tui::{
    ErrorKind, FetchError, PokemonApi, PokemonRecord, SearchController, SearchState,
};
use reqwest::StatusCode;
use tokio::sync::Notify;

#[derive(Clone)]
enum Reply {
    Found { images: usize },
    NotFound,
    Decode,
    ServerError,
}

#[derive(Default)]
struct StubClient {
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
    replies: Mutex<HashMap<String, Reply>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl StubClient {
    fn reply(self, name: &str, reply: Reply) -> Self {
        self.replies.lock().unwrap().insert(name.to_string(), reply);
        self
    }

    fn found(self, name: &str, images: usize) -> Self {
        self.reply(name, Reply::Found { images })
    }

    /// Hold lookups of `name` until the returned gate is notified.
    fn gate(&self, name: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(name.to_string(), Arc::clone(&gate));
        gate
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

fn record(name: &str, images: usize) -> PokemonRecord {
    PokemonRecord {
        name: name.to_string(),
        image_urls: (0..images)
            .map(|i| format!("https://img/{name}/{i}.png"))
            .collect(),
        abilities: vec!["limber".to_string()],
        types: vec!["normal".to_string()],
    }
}

#[async_trait]
impl PokemonApi for StubClient {
    async fn fetch(&self, name: &str) -> Result<PokemonRecord, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(name.to_string());

        let gate = self.gates.lock().unwrap().get(name).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let reply = self.replies.lock().unwrap().get(name).cloned();
        match reply.unwrap_or(Reply::NotFound) {
            Reply::Found { images } => Ok(record(name, images)),
            Reply::NotFound => Err(FetchError::NotFound {
                name: name.to_string(),
            }),
            Reply::Decode => Err(FetchError::Decode("missing types list".to_string())),
            Reply::ServerError => Err(FetchError::UnexpectedStatus(
                StatusCode::SERVICE_UNAVAILABLE,
            )),
        }
    }
}

fn controller(stub: StubClient) -> (Arc<StubClient>, SearchController<StubClient>) {
    let stub = Arc::new(stub);
    let controller = SearchController::from_arc(Arc::clone(&stub));
    (stub, controller)
}

fn resolved_name(controller: &SearchController<StubClient>) -> Option<String> {
    controller.state().record().map(|r| r.name.clone())
}

#[tokio::test]
async fn starts_idle() {
    let (_, controller) = controller(StubClient::default());
    assert_eq!(controller.state(), SearchState::Idle);
    assert_eq!(controller.latest_sequence(), 0);
}

#[tokio::test]
async fn blank_input_fails_without_network_call() {
    let (stub, controller) = controller(StubClient::default().found("mew", 1));

    for input in ["", " ", "   ", "\t\n"] {
        assert!(controller.submit(input).is_none());
        assert_eq!(
            controller.state(),
            SearchState::Failure {
                kind: ErrorKind::EmptyInput,
                message: "Enter Pokemon Name".to_string(),
            }
        );
    }
    assert_eq!(stub.calls(), 0);
}

#[tokio::test]
async fn loading_is_visible_before_fetch_resolves() {
    let stub = StubClient::default().found("pikachu", 1);
    let gate = stub.gate("pikachu");
    let (_, controller) = controller(stub);

    let handle = controller.submit("pikachu").unwrap();
    assert_eq!(controller.state(), SearchState::Loading);
    assert!(!controller.state().is_terminal());

    gate.notify_one();
    handle.await.unwrap();
    assert!(controller.state().is_terminal());
    assert_eq!(resolved_name(&controller).as_deref(), Some("pikachu"));
}

#[tokio::test]
async fn lookup_name_is_trimmed_and_lowercased() {
    let (stub, controller) = controller(StubClient::default().found("pikachu", 1));

    controller.submit("  Pikachu ").unwrap().await.unwrap();

    assert_eq!(stub.requested(), vec!["pikachu"]);
    assert_eq!(resolved_name(&controller).as_deref(), Some("pikachu"));
}

#[tokio::test]
async fn not_found_maps_to_its_message() {
    let (_, controller) = controller(StubClient::default().reply("zzz", Reply::NotFound));

    controller.submit("zzz").unwrap().await.unwrap();

    assert_eq!(
        controller.state(),
        SearchState::Failure {
            kind: ErrorKind::NotFound,
            message: "Pokemon not found".to_string(),
        }
    );
}

#[tokio::test]
async fn decode_and_transport_failures_map_by_kind() {
    let (_, controller) = controller(
        StubClient::default()
            .reply("glitch", Reply::Decode)
            .reply("offline", Reply::ServerError),
    );

    controller.submit("glitch").unwrap().await.unwrap();
    assert_eq!(controller.state(), SearchState::failure(ErrorKind::Decode));

    controller.submit("offline").unwrap().await.unwrap();
    assert_eq!(controller.state(), SearchState::failure(ErrorKind::Transport));
    if let SearchState::Failure { message, .. } = controller.state() {
        assert_eq!(message, "Network error");
    }
}

#[tokio::test]
async fn record_without_artwork_succeeds() {
    let (_, controller) = controller(StubClient::default().found("missingno", 0));

    controller.submit("missingno").unwrap().await.unwrap();

    let state = controller.state();
    let record = state.record().unwrap();
    assert!(record.image_urls.is_empty());
    assert_eq!(record.primary_image(), None);
}

#[tokio::test]
async fn identical_submissions_each_fetch() {
    let (stub, controller) = controller(StubClient::default().found("eevee", 1));

    controller.submit("eevee").unwrap().await.unwrap();
    controller.submit("eevee").unwrap().await.unwrap();

    assert_eq!(stub.calls(), 2);
    assert_eq!(controller.latest_sequence(), 2);
}

#[tokio::test]
async fn new_submission_replaces_previous_result() {
    let (_, controller) = controller(
        StubClient::default()
            .found("mew", 1)
            .reply("zzz", Reply::NotFound),
    );

    controller.submit("zzz").unwrap().await.unwrap();
    assert_eq!(controller.state(), SearchState::failure(ErrorKind::NotFound));

    controller.submit("mew").unwrap().await.unwrap();
    assert_eq!(resolved_name(&controller).as_deref(), Some("mew"));

    assert!(controller.submit("").is_none());
    assert_eq!(controller.state(), SearchState::failure(ErrorKind::EmptyInput));
}

#[tokio::test]
async fn stale_response_is_discarded() {
    let stub = StubClient::default().found("ditto", 1).found("mew", 2);
    let ditto_gate = stub.gate("ditto");
    let mew_gate = stub.gate("mew");
    let (stub, controller) = controller(stub);

    let ditto = controller.submit("ditto").unwrap();
    let mew = controller.submit("mew").unwrap();
    assert_eq!(controller.state(), SearchState::Loading);

    mew_gate.notify_one();
    mew.await.unwrap();
    assert_eq!(resolved_name(&controller).as_deref(), Some("mew"));

    let updates = controller.subscribe();
    ditto_gate.notify_one();
    ditto.await.unwrap();

    assert_eq!(stub.calls(), 2);
    assert_eq!(resolved_name(&controller).as_deref(), Some("mew"));
    assert!(!updates.has_changed().unwrap());
}

#[tokio::test]
async fn blank_submission_supersedes_lookup_in_flight() {
    let stub = StubClient::default().found("mew", 1);
    let gate = stub.gate("mew");
    let (_, controller) = controller(stub);

    let mew = controller.submit("mew").unwrap();
    assert!(controller.submit("  ").is_none());

    gate.notify_one();
    mew.await.unwrap();

    assert_eq!(controller.state(), SearchState::failure(ErrorKind::EmptyInput));
}

#[tokio::test]
async fn subscribers_see_loading_then_result() {
    let stub = StubClient::default().found("snorlax", 1);
    let gate = stub.gate("snorlax");
    let (_, controller) = controller(stub);
    let mut updates = controller.subscribe();

    let handle = controller.submit("Snorlax").unwrap();
    updates.changed().await.unwrap();
    assert_eq!(*updates.borrow_and_update(), SearchState::Loading);

    gate.notify_one();
    updates.changed().await.unwrap();
    let state = updates.borrow_and_update().clone();
    assert_eq!(state.record().map(|r| r.name.as_str()), Some("snorlax"));

    handle.await.unwrap();
}
