//! Pulling caption-like text out of downloaded HTML.

mod json_ld;
mod meta;
mod text;

pub(crate) use json_ld::extract_json_ld_recipe;
pub(crate) use meta::extract_meta_description;
pub(crate) use text::extract_inner_texts;
