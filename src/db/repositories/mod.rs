mod context_blocks;
