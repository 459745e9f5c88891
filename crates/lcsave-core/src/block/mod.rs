mod framer;
mod layout;

pub use framer::{
    BLOCK_ALIGNMENT, BlockFramer, BlockMark, TAG_LEN, TAGGED_OVERHEAD, UNTAGGED_OVERHEAD,
    begin_block, checksum, end_block, framed_len, read_block, read_block_at, read_record_block,
    write_block, write_padding_block, write_record_block,
};
pub use layout::{BlockLayout, Section};
