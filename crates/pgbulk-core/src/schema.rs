mod converter;
pub use converter::ValueConverter;

mod descriptor;
pub use descriptor::{TableDescriptor, TableDescriptorBuilder};

mod output_id;
pub use output_id::{sequential_id, OutputId, OutputIdMode};

mod property;
pub use property::{properties, Property};

mod record;
pub use record::Record;

pub mod registry;
