mod cache_sharing;
mod pipeline_flow;
mod supersession;
