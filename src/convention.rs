// Hardware models understood by the core. The model decides work RAM/VRAM banking, the renderer
// path and the initial register file.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum Term {
    GB,  // Original GameBoy (Dot Matrix Game)
    GBC, // GameBoy Color
}

// The frontend can force a model instead of trusting the CGB flag at 0x0143.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub enum TermSelect {
    Auto,
    GB,
    GBC,
}
