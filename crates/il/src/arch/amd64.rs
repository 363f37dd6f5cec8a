//! The amd64 register file.

use std::borrow::Cow;
use std::sync::LazyLock;

use super::{Architecture, PartialWrite, RegisterId, RegisterMapping, RegisterTable};
use crate::register::RegisterDesc;

macro_rules! registers {
    ($($name:ident = $id:literal => $mnemonic:literal),* $(,)?) => {
        $(pub const $name: RegisterId = RegisterId($id);)*

        const NAMES: &[(RegisterId, &str)] = &[$(($name, $mnemonic)),*];
    };
}

registers! {
    RAX = 1 => "rax", EAX = 2 => "eax", AX = 3 => "ax", AH = 4 => "ah", AL = 5 => "al",
    RBX = 6 => "rbx", EBX = 7 => "ebx", BX = 8 => "bx", BH = 9 => "bh", BL = 10 => "bl",
    RCX = 11 => "rcx", ECX = 12 => "ecx", CX = 13 => "cx", CH = 14 => "ch", CL = 15 => "cl",
    RDX = 16 => "rdx", EDX = 17 => "edx", DX = 18 => "dx", DH = 19 => "dh", DL = 20 => "dl",
    RDI = 21 => "rdi", EDI = 22 => "edi", DI = 23 => "di", DIL = 24 => "dil",
    RSI = 25 => "rsi", ESI = 26 => "esi", SI = 27 => "si", SIL = 28 => "sil",
    RBP = 29 => "rbp", EBP = 30 => "ebp", BP = 31 => "bp", BPL = 32 => "bpl",
    RSP = 33 => "rsp", ESP = 34 => "esp", SP = 35 => "sp", SPL = 36 => "spl",
    R8 = 37 => "r8", R8D = 38 => "r8d", R8W = 39 => "r8w", R8B = 40 => "r8b",
    R9 = 41 => "r9", R9D = 42 => "r9d", R9W = 43 => "r9w", R9B = 44 => "r9b",
    R10 = 45 => "r10", R10D = 46 => "r10d", R10W = 47 => "r10w", R10B = 48 => "r10b",
    R11 = 49 => "r11", R11D = 50 => "r11d", R11W = 51 => "r11w", R11B = 52 => "r11b",
    R12 = 53 => "r12", R12D = 54 => "r12d", R12W = 55 => "r12w", R12B = 56 => "r12b",
    R13 = 57 => "r13", R13D = 58 => "r13d", R13W = 59 => "r13w", R13B = 60 => "r13b",
    R14 = 61 => "r14", R14D = 62 => "r14d", R14W = 63 => "r14w", R14B = 64 => "r14b",
    R15 = 65 => "r15", R15D = 66 => "r15d", R15W = 67 => "r15w", R15B = 68 => "r15b",
    EFLAGS = 69 => "eflags",
    RIP = 70 => "rip",
}

/// Families with an addressable high byte: `[qword, dword, word, high byte, low byte]`.
const HIGH_BYTE_FAMILIES: [[RegisterId; 5]; 4] = [
    [RAX, EAX, AX, AH, AL],
    [RBX, EBX, BX, BH, BL],
    [RCX, ECX, CX, CH, CL],
    [RDX, EDX, DX, DH, DL],
];

/// Families without a high byte: `[qword, dword, word, low byte]`.
const LOW_BYTE_FAMILIES: [[RegisterId; 4]; 12] = [
    [RDI, EDI, DI, DIL],
    [RSI, ESI, SI, SIL],
    [RBP, EBP, BP, BPL],
    [RSP, ESP, SP, SPL],
    [R8, R8D, R8W, R8B],
    [R9, R9D, R9W, R9B],
    [R10, R10D, R10W, R10B],
    [R11, R11D, R11W, R11B],
    [R12, R12D, R12W, R12B],
    [R13, R13D, R13W, R13B],
    [R14, R14D, R14W, R14B],
    [R15, R15D, R15W, R15B],
];

static TABLE: LazyLock<RegisterTable> = LazyLock::new(build_table);

fn build_table() -> RegisterTable {
    let mut entries = Vec::new();
    for [qword, dword, word, high, low] in HIGH_BYTE_FAMILIES {
        entries.extend([
            (qword, RegisterMapping::new(qword, 0, 8)),
            (dword, RegisterMapping::new(qword, 0, 4)),
            (word, RegisterMapping::new(qword, 0, 2)),
            (high, RegisterMapping::new(qword, 1, 1)),
            (low, RegisterMapping::new(qword, 0, 1)),
        ]);
    }

    for [qword, dword, word, low] in LOW_BYTE_FAMILIES {
        entries.extend([
            (qword, RegisterMapping::new(qword, 0, 8)),
            (dword, RegisterMapping::new(qword, 0, 4)),
            (word, RegisterMapping::new(qword, 0, 2)),
            (low, RegisterMapping::new(qword, 0, 1)),
        ]);
    }

    // Flags are modeled as a full 64-bit register
    entries.push((EFLAGS, RegisterMapping::new(EFLAGS, 0, 8)));

    RegisterTable::new(entries)
}

pub fn register_table() -> &'static RegisterTable {
    &TABLE
}

/// Looks up a register by its mnemonic, ignoring case.
pub fn register_from_name(name: impl AsRef<str>) -> Option<RegisterId> {
    let name = name.as_ref();
    NAMES
        .iter()
        .find(|(_, mnemonic)| mnemonic.eq_ignore_ascii_case(name))
        .map(|(register, _)| *register)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Amd64;

impl Architecture for Amd64 {
    fn registers(&self) -> &RegisterTable {
        register_table()
    }

    fn register_name(&self, id: RegisterId) -> Cow<'static, str> {
        NAMES
            .iter()
            .find(|(register, _)| *register == id)
            .map(|(_, name)| Cow::Borrowed(*name))
            .unwrap_or_else(|| Cow::Owned(id.to_string()))
    }

    fn is_restricted(&self, base: RegisterId) -> bool {
        base == RSP
    }

    /// Writes to the 32-bit form of a general purpose register clear its upper half.
    fn partial_write(&self, register: &RegisterDesc) -> PartialWrite {
        if register.bit_offset() == 0 && register.bit_count() == 32 && register.base() != EFLAGS {
            PartialWrite::ZeroExtend
        } else {
            PartialWrite::Merge
        }
    }
}
