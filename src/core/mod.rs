pub mod archive_handler;
pub mod image_lister;
pub mod labels;
pub mod mover;
pub mod pagination;

pub use archive_handler::{ArchiveHandler, ArchiveInfo, ArchiveSummary, ZipHandler};
pub use image_lister::{is_image_name, list_images};
pub use labels::{Label, LabelRegistry};
pub use mover::move_file;
pub use pagination::{paginate, parse_page_param, Page};
