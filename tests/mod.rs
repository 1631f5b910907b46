mod event_payload_tests;
mod google_calendar_mock;
mod router_tests;

// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - smoke_tests: Basic functionality tests to ensure nothing is broken
// - validation_tests: Draft validation rules for the event form
// - event_payload_tests: Serialization into Google's event schema
// - session_tests: Session cookie issuing and validation
// - oauth_tests: OAuth URL construction and token bookkeeping
// - router_tests: Routing and the signed-in/signed-out page states
// - google_calendar_mock: Mocking the Google Calendar API for testing
