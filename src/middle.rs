//! Low-level intermediate representation: addresses, the three-address
//! instruction set, the program buffer that holds emitted instructions, and
//! the temp-cell allocator.

pub mod address;
pub mod pb;
pub mod temp;

pub use address::{Address, AddressKind};
pub use pb::{Instruction, Op, ProgramBuffer};
pub use temp::TempAllocator;
