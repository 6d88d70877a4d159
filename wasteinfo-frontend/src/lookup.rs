use std::fmt;

use thiserror::Error;

use wasteinfo_boundary::{Center, Coordinate};
use wasteinfo_frontend_api::WasteInfoApi;

use crate::geolocation::{GeolocationError, Geolocator};

pub const NOT_AVAILABLE: &str = "Not available";

// Not whitespace according to Unicode, but typed input may carry it.
const BYTE_ORDER_MARK: char = '\u{feff}';

/// The location string sent to the waste info service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery(String);

impl LocationQuery {
    pub fn typed(text: &str) -> Result<Self, LookupError> {
        let text = text.trim_matches(|c: char| c.is_whitespace() || c == BYTE_ORDER_MARK);
        if text.is_empty() {
            return Err(LookupError::EmptyInput);
        }
        Ok(Self(text.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Coordinate> for LocationQuery {
    fn from(Coordinate { lat, lng }: Coordinate) -> Self {
        Self(format!("{lat},{lng}"))
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Selects the wording of the "nothing found" message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vicinity {
    ThisLocation,
    CurrentLocation,
}

impl Vicinity {
    const fn phrase(self) -> &'static str {
        match self {
            Self::ThisLocation => "this location",
            Self::CurrentLocation => "your current location",
        }
    }
}

/// Everything that can go wrong during a lookup.
///
/// The display form is what the user gets to see,
/// details are only written to the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Please enter a location.")]
    EmptyInput,
    #[error("Failed to fetch info. Try again later.")]
    Fetch,
    #[error("Geolocation is not supported by your browser.")]
    GeolocationUnsupported,
    #[error("Unable to fetch your current location. Please enable location services or try again.")]
    GeolocationFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(Vec<Center>),
    NoResults(Vicinity),
    Failed(LookupError),
}

impl LookupOutcome {
    /// The text shown instead of center cards.
    #[must_use]
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Found(_) => None,
            Self::NoResults(vicinity) => Some(format!(
                "No recycling centers found near {}.",
                vicinity.phrase()
            )),
            Self::Failed(err) => Some(format!("Error: {err}")),
        }
    }

    #[must_use]
    pub fn cards(&self) -> Vec<CenterDetails> {
        match self {
            Self::Found(centers) => centers.iter().map(CenterDetails::from).collect(),
            Self::NoResults(_) | Self::Failed(_) => Vec::new(),
        }
    }
}

/// A center with every field ready for display.
#[rustfmt::skip]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CenterDetails {
    pub name          : String,
    pub address       : String,
    pub contact       : String,
    pub opening_hours : String,
    pub description   : String,
}

impl From<&Center> for CenterDetails {
    fn from(center: &Center) -> Self {
        let Center {
            name,
            address,
            contact,
            opening_hours,
            description,
        } = center;
        Self {
            name: or_not_available(name.as_deref()),
            address: or_not_available(address.as_deref()),
            contact: or_not_available(contact.as_deref()),
            opening_hours: or_not_available(opening_hours.as_deref()),
            description: or_not_available(description.as_deref()),
        }
    }
}

fn or_not_available(field: Option<&str>) -> String {
    field
        .filter(|value| !value.is_empty())
        .unwrap_or(NOT_AVAILABLE)
        .to_owned()
}

/// Identifies a started lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What the results container and the busy indicator show.
///
/// Only the most recently started lookup may change the state;
/// outcomes of superseded lookups are rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupState {
    pub busy: bool,
    pub outcome: Option<LookupOutcome>,
    latest: u64,
}

impl LookupState {
    /// Shows the busy indicator and clears the previous results.
    pub fn start(&mut self) -> Ticket {
        self.latest += 1;
        self.busy = true;
        self.outcome = None;
        Ticket(self.latest)
    }

    /// Returns `false` if the lookup has been superseded in the meantime.
    pub fn finish(&mut self, ticket: Ticket, outcome: LookupOutcome) -> bool {
        if !self.is_latest(ticket) {
            return false;
        }
        self.outcome = Some(outcome);
        true
    }

    /// Hides the busy indicator unless a newer lookup is still running.
    pub fn release(&mut self, ticket: Ticket) {
        if self.is_latest(ticket) {
            self.busy = false;
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.outcome.as_ref().and_then(LookupOutcome::message)
    }

    #[must_use]
    pub fn cards(&self) -> Vec<CenterDetails> {
        self.outcome
            .as_ref()
            .map(LookupOutcome::cards)
            .unwrap_or_default()
    }

    const fn is_latest(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

/// Hides the busy indicator when dropped,
/// no matter how the lookup future ends.
pub struct BusyGuard<F>
where
    F: FnMut(Ticket),
{
    ticket: Ticket,
    release: F,
}

impl<F> BusyGuard<F>
where
    F: FnMut(Ticket),
{
    /// `release` is expected to call [`LookupState::release`].
    pub const fn new(ticket: Ticket, release: F) -> Self {
        Self { ticket, release }
    }
}

impl<F> Drop for BusyGuard<F>
where
    F: FnMut(Ticket),
{
    fn drop(&mut self) {
        (self.release)(self.ticket);
    }
}

pub async fn lookup<A>(api: &A, query: &LocationQuery, vicinity: Vicinity) -> LookupOutcome
where
    A: WasteInfoApi + ?Sized,
{
    log::debug!("Looking up waste centers near {query}");
    match api.waste_info(query.as_str()).await {
        Ok(response) => {
            if let Some(err) = response.error {
                log::warn!("Waste info service reported an error: {err}");
            }
            if response.reply.is_empty() {
                LookupOutcome::NoResults(vicinity)
            } else {
                log::debug!("Found {} centers near {query}", response.reply.len());
                LookupOutcome::Found(response.reply)
            }
        }
        Err(err) => {
            log::error!("Unable to fetch waste info: {err}");
            LookupOutcome::Failed(LookupError::Fetch)
        }
    }
}

pub async fn lookup_typed_location<A>(api: &A, text: &str) -> LookupOutcome
where
    A: WasteInfoApi + ?Sized,
{
    match LocationQuery::typed(text) {
        Ok(query) => lookup(api, &query, Vicinity::ThisLocation).await,
        Err(err) => LookupOutcome::Failed(err),
    }
}

pub async fn lookup_current_location<A, G>(api: &A, geolocator: &G) -> LookupOutcome
where
    A: WasteInfoApi + ?Sized,
    G: Geolocator + ?Sized,
{
    match geolocator.current_position().await {
        Ok(position) => {
            let query = LocationQuery::from(position);
            lookup(api, &query, Vicinity::CurrentLocation).await
        }
        Err(GeolocationError::Unsupported) => {
            log::warn!("Geolocation is not available");
            LookupOutcome::Failed(LookupError::GeolocationUnsupported)
        }
        Err(err) => {
            log::error!("Unable to fetch current location: {err}");
            LookupOutcome::Failed(LookupError::GeolocationFailed)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        cell::RefCell,
        future::Future,
        pin::pin,
        sync::Arc,
        task::{Context, Wake, Waker},
    };

    use async_trait::async_trait;
    use pollster::block_on;

    use wasteinfo_boundary::WasteInfoResponse;
    use wasteinfo_frontend_api as api;

    use super::*;

    struct FakeApi {
        response: api::Result<WasteInfoResponse>,
        requests: RefCell<Vec<String>>,
    }

    impl FakeApi {
        fn replying(reply: Vec<Center>) -> Self {
            Self::responding(Ok(WasteInfoResponse { reply, error: None }))
        }
        fn responding(response: api::Result<WasteInfoResponse>) -> Self {
            Self {
                response,
                requests: RefCell::default(),
            }
        }
        fn requests(&self) -> Vec<String> {
            self.requests.borrow().clone()
        }
    }

    #[async_trait(?Send)]
    impl WasteInfoApi for FakeApi {
        async fn waste_info(&self, location: &str) -> api::Result<WasteInfoResponse> {
            self.requests.borrow_mut().push(location.to_owned());
            self.response.clone()
        }
    }

    struct NoopWake;

    impl Wake for NoopWake {
        fn wake(self: Arc<Self>) {}
    }

    struct FakeGeolocator(Result<Coordinate, GeolocationError>);

    #[async_trait(?Send)]
    impl Geolocator for FakeGeolocator {
        async fn current_position(&self) -> Result<Coordinate, GeolocationError> {
            self.0.clone()
        }
    }

    fn center(name: &str) -> Center {
        Center {
            name: Some(name.to_owned()),
            ..Default::default()
        }
    }

    fn run(state: &mut LookupState, outcome: LookupOutcome) {
        let cell = RefCell::new(std::mem::take(state));
        let ticket = cell.borrow_mut().start();
        {
            let _busy = busy_guard(&cell, ticket);
            assert!(cell.borrow().busy);
            assert!(cell.borrow_mut().finish(ticket, outcome));
        }
        *state = cell.into_inner();
    }

    fn busy_guard(
        cell: &RefCell<LookupState>,
        ticket: Ticket,
    ) -> BusyGuard<impl FnMut(Ticket) + '_> {
        BusyGuard::new(ticket, move |ticket| cell.borrow_mut().release(ticket))
    }

    #[test]
    fn blank_input_is_rejected_without_request() {
        for text in ["", "  ", "\t\n "] {
            let api = FakeApi::replying(vec![center("Center A")]);
            let outcome = block_on(lookup_typed_location(&api, text));
            assert_eq!(outcome, LookupOutcome::Failed(LookupError::EmptyInput));
            assert!(api.requests().is_empty());

            let mut state = LookupState::default();
            run(&mut state, outcome);
            assert!(!state.busy);
            assert_eq!(
                state.message().as_deref(),
                Some("Error: Please enter a location.")
            );
            assert!(state.cards().is_empty());
        }
    }

    #[test]
    fn typed_location_is_trimmed() {
        let api = FakeApi::replying(vec![]);
        block_on(lookup_typed_location(&api, "  Berlin \n"));
        block_on(lookup_typed_location(&api, "\u{feff}Paris\u{a0}"));
        assert_eq!(api.requests(), ["Berlin", "Paris"]);
    }

    #[test]
    fn byte_order_mark_only_is_blank() {
        let api = FakeApi::replying(vec![center("Center A")]);
        let outcome = block_on(lookup_typed_location(&api, "\u{feff} \u{feff}"));
        assert_eq!(outcome, LookupOutcome::Failed(LookupError::EmptyInput));
        assert!(api.requests().is_empty());
    }

    #[test]
    fn dropped_guard_hides_busy_indicator() {
        let state = RefCell::new(LookupState::default());
        let ticket = state.borrow_mut().start();
        let busy = busy_guard(&state, ticket);
        assert!(state.borrow().busy);
        drop(busy);
        assert!(!state.borrow().busy);
        assert_eq!(state.borrow().outcome, None);
    }

    #[test]
    fn superseded_guard_keeps_busy_indicator() {
        let state = RefCell::new(LookupState::default());
        let first = state.borrow_mut().start();
        let first_busy = busy_guard(&state, first);
        let second = state.borrow_mut().start();
        let second_busy = busy_guard(&state, second);

        drop(first_busy);
        assert!(state.borrow().busy);

        drop(second_busy);
        assert!(!state.borrow().busy);
    }

    #[test]
    fn cancelled_lookup_hides_busy_indicator() {
        let state = RefCell::new(LookupState::default());
        let api = FakeApi::replying(vec![center("Center A")]);
        {
            let mut lookup = pin!(async {
                let ticket = state.borrow_mut().start();
                let _busy = busy_guard(&state, ticket);
                std::future::pending::<()>().await;
                let outcome = lookup_typed_location(&api, "Berlin").await;
                state.borrow_mut().finish(ticket, outcome);
            });
            let waker = Waker::from(Arc::new(NoopWake));
            let mut cx = Context::from_waker(&waker);
            assert!(lookup.as_mut().poll(&mut cx).is_pending());
            assert!(state.borrow().busy);
        }
        assert!(!state.borrow().busy);
        assert_eq!(state.borrow().outcome, None);
        assert!(api.requests().is_empty());
    }

    #[test]
    fn render_one_card_per_center_in_order() {
        let centers = vec![center("C"), center("A"), center("B")];
        let api = FakeApi::replying(centers);
        let mut state = LookupState::default();
        run(&mut state, block_on(lookup_typed_location(&api, "Hamburg")));
        let names: Vec<_> = state.cards().into_iter().map(|c| c.name).collect();
        assert_eq!(names, ["C", "A", "B"]);
        assert_eq!(state.message(), None);
    }

    #[test]
    fn missing_fields_are_not_available() {
        let api = FakeApi::replying(vec![Center {
            name: Some("Center A".to_owned()),
            address: Some("Main St 1".to_owned()),
            description: Some(String::new()),
            ..Default::default()
        }]);
        let mut state = LookupState::default();
        run(&mut state, block_on(lookup_typed_location(&api, "Berlin")));
        assert_eq!(api.requests(), ["Berlin"]);
        assert_eq!(
            state.cards(),
            [CenterDetails {
                name: "Center A".to_owned(),
                address: "Main St 1".to_owned(),
                contact: NOT_AVAILABLE.to_owned(),
                opening_hours: NOT_AVAILABLE.to_owned(),
                description: NOT_AVAILABLE.to_owned(),
            }]
        );
    }

    #[test]
    fn empty_reply_means_no_results() {
        let api = FakeApi::replying(vec![]);
        let mut state = LookupState::default();
        run(&mut state, block_on(lookup_typed_location(&api, "Nowhere")));
        assert!(state.cards().is_empty());
        assert_eq!(
            state.message().as_deref(),
            Some("No recycling centers found near this location.")
        );
    }

    #[test]
    fn backend_error_body_means_no_results() {
        let api = FakeApi::responding(Ok(WasteInfoResponse {
            reply: vec![],
            error: Some("Location not found.".to_owned()),
        }));
        let outcome = block_on(lookup_typed_location(&api, "Atlantis"));
        assert_eq!(outcome, LookupOutcome::NoResults(Vicinity::ThisLocation));
    }

    #[test]
    fn fetch_failure_shows_generic_message() {
        let api = FakeApi::responding(Err(api::Error::Fetch("connection refused".to_owned())));
        let mut state = LookupState::default();
        run(&mut state, block_on(lookup_typed_location(&api, "Berlin")));
        assert!(!state.busy);
        assert!(state.cards().is_empty());
        assert_eq!(
            state.message().as_deref(),
            Some("Error: Failed to fetch info. Try again later.")
        );
    }

    #[test]
    fn current_location_is_sent_as_coordinates() {
        let api = FakeApi::replying(vec![]);
        let geolocator = FakeGeolocator(Ok(Coordinate {
            lat: 12.34,
            lng: 56.78,
        }));
        let outcome = block_on(lookup_current_location(&api, &geolocator));
        assert_eq!(api.requests(), ["12.34,56.78"]);
        assert_eq!(
            outcome.message().as_deref(),
            Some("No recycling centers found near your current location.")
        );
    }

    #[test]
    fn geolocation_failures_skip_request() {
        for (err, expected) in [
            (
                GeolocationError::PermissionDenied,
                LookupError::GeolocationFailed,
            ),
            (GeolocationError::Timeout, LookupError::GeolocationFailed),
            (
                GeolocationError::Unsupported,
                LookupError::GeolocationUnsupported,
            ),
        ] {
            let api = FakeApi::replying(vec![center("Center A")]);
            let outcome = block_on(lookup_current_location(&api, &FakeGeolocator(Err(err))));
            assert!(api.requests().is_empty());

            let mut state = LookupState::default();
            run(&mut state, outcome);
            assert!(!state.busy);
            assert_eq!(
                state.message(),
                Some(format!("Error: {expected}"))
            );
        }
        assert_eq!(
            LookupOutcome::Failed(LookupError::GeolocationFailed)
                .message()
                .as_deref(),
            Some("Error: Unable to fetch your current location. Please enable location services or try again.")
        );
    }

    #[test]
    fn superseded_lookup_is_discarded() {
        let mut state = LookupState::default();
        let first = state.start();
        let second = state.start();

        assert!(!state.finish(first, LookupOutcome::Found(vec![center("Old")])));
        state.release(first);
        assert!(state.busy);
        assert_eq!(state.outcome, None);

        assert!(state.finish(second, LookupOutcome::Found(vec![center("New")])));
        state.release(second);
        assert!(!state.busy);
        assert_eq!(state.cards()[0].name, "New");
    }

    #[test]
    fn start_clears_previous_results() {
        let mut state = LookupState::default();
        run(&mut state, LookupOutcome::Found(vec![center("A")]));
        assert_eq!(state.cards().len(), 1);
        state.start();
        assert!(state.busy);
        assert!(state.cards().is_empty());
        assert_eq!(state.message(), None);
    }
}
