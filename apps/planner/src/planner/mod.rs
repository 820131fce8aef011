// Travel planner: input collection, prompt construction, suggestion fetching, page rendering.
// All LLM calls go through llm_client; no direct provider calls here.

pub mod fetcher;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod render;
