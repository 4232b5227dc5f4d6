pub mod mock_requester;

pub use mock_requester::MockRequester;
