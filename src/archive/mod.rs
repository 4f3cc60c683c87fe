mod end_record;
mod format;
mod local_entry;
mod reader;
mod writer;

pub use end_record::{EndRecord, END_RECORD_SIGNATURE, END_RECORD_SIZE};
pub use format::{
    CentralDirectoryEntry, CompressionMethod, DosDateTime, CENTRAL_DIRECTORY_FIXED_SIZE,
    CENTRAL_DIRECTORY_SIGNATURE, FLAG_ENCRYPTED, FLAG_UTF8, VERSION_MADE_BY, VERSION_NEEDED,
    ZIP64_MARKER,
};
pub use local_entry::{LocalEntryHeader, LOCAL_ENTRY_FIXED_SIZE, LOCAL_ENTRY_SIGNATURE};
pub use reader::{scan_container, ContainerEntry, EntryLocator, EntrySource};
pub(crate) use reader::read_directory;
pub use writer::ContainerWriter;
