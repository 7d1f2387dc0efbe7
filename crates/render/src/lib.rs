//! # annal_render
//!
//! Interprets view, list and field records of an Annalist collection and
//! renders entity values through them.
//!
//! ## Pipeline
//!
//! 1. [`view::describe_view`] loads a view record and builds one
//!    [`FieldDescriptor`] per field reference, resolving choices
//!    ([`choices`]) and placements ([`placement`]) and renaming duplicate
//!    form names and properties.
//! 2. A [`BoundField`] pairs a descriptor with entity values and request
//!    [`Extras`]; values and reference targets are resolved lazily.
//! 3. The [`RendererRegistry`] picks a renderer by render type and value
//!    mode and produces an HTML fragment.
//! 4. On submission [`view::decode_form`] maps form text back to values
//!    through the [`mappers`].
//!
//! ## Example
//!
//! ```no_run
//! use annal_render::{Extras, RenderMode, RendererRegistry, render_view_html, describe_view};
//! # fn demo(coll: &annal_models::Collection) -> annal_core::AnnalResult<()> {
//! let view = describe_view(coll, "Default_view")?;
//! let entity = coll.load_entity("testtype", "entity1", None)?;
//! if let Some(entity) = entity {
//!     let html = render_view_html(
//!         &RendererRegistry::standard(),
//!         &view,
//!         entity.values(),
//!         &Extras::default(),
//!         RenderMode::View,
//!         coll,
//!     );
//!     println!("{}", html);
//! }
//! # Ok(())
//! # }
//! ```

pub mod bound;
pub mod choices;
pub mod descriptor;
pub mod finder;
pub mod mappers;
pub mod placement;
pub mod renderers;
pub mod selector;
pub mod view;

pub use bound::{BoundField, Extras, TargetEntity, TargetError, TargetResolver};
pub use choices::{ChoiceMap, FieldChoice};
pub use descriptor::{FieldDescriptor, GroupDescriptor};
pub use finder::EntityFinder;
pub use placement::{Placement, parse_placement};
pub use renderers::{RenderMode, RendererRegistry};
pub use selector::{Selector, SelectorContext};
pub use view::{
    DecodedForm, FormInput, ListDescription, PendingResource, ResourceSource, ViewDescription,
    apply_resources, decode_form, describe_list, describe_view, render_list_html, render_view_html,
};
