mod common;

use common::{assemble, read_register, reg, register, run};
use sym::SymbolicBitVec;
use symbolic_il::{Amd64, Opcode, Operand, SymbolicVm};

/// Confirms general-purpose register aliasing.
#[test]
fn amd64_registers() {
    let mut vm = SymbolicVm::new(Amd64);
    let value = SymbolicBitVec::constant(0x8877665544332211, 64);

    for register_name in ['a', 'b', 'c', 'd'] {
        vm.write_register(&register(format!("r{register_name}x")), value.clone());
        let rax: u64 = read_register(&vm, format!("r{register_name}x"));
        assert_eq!(rax, 0x8877665544332211);
        let eax: u32 = read_register(&vm, format!("e{register_name}x"));
        assert_eq!(eax, 0x44332211);
        let ax: u16 = read_register(&vm, format!("{register_name}x"));
        assert_eq!(ax, 0x2211);
        let ah: u8 = read_register(&vm, format!("{register_name}h"));
        assert_eq!(ah, 0x22);
        let al: u8 = read_register(&vm, format!("{register_name}l"));
        assert_eq!(al, 0x11);
    }

    for register_name in ["si", "di", "bp", "sp"] {
        vm.write_register(&register(format!("r{register_name}")), value.clone());
        let r: u64 = read_register(&vm, format!("r{register_name}"));
        assert_eq!(r, 0x8877665544332211);
        let e: u32 = read_register(&vm, format!("e{register_name}"));
        assert_eq!(e, 0x44332211);
        let w: u16 = read_register(&vm, register_name);
        assert_eq!(w, 0x2211);
        let l: u8 = read_register(&vm, format!("{register_name}l"));
        assert_eq!(l, 0x11);
    }

    for register_number in 8..=15 {
        vm.write_register(&register(format!("r{register_number}")), value.clone());
        let r: u64 = read_register(&vm, format!("r{register_number}"));
        assert_eq!(r, 0x8877665544332211);
        let d: u32 = read_register(&vm, format!("r{register_number}d"));
        assert_eq!(d, 0x44332211);
        let w: u16 = read_register(&vm, format!("r{register_number}w"));
        assert_eq!(w, 0x2211);
        let b: u8 = read_register(&vm, format!("r{register_number}b"));
        assert_eq!(b, 0x11);
    }
}

/// Executes a function prologue and epilogue that spills and restores registers:
///
/// ```text
/// sub rsp, 8
/// str [rsp], rbp
/// mov rbp, rsp
/// sub rsp, 16
/// str [rbp - 8], rdi
/// str [rbp - 16], esi
/// mov rdi, 0
/// ldd rax, [rbp - 8]
/// ldd ecx, [rbp - 16]
/// add rsp, 16
/// ldd rbp, [rsp]
/// add rsp, 8
/// ```
#[test]
fn spill_and_restore() {
    let block = assemble([
        (Opcode::Sub, vec![reg("rsp"), Operand::imm(8)]),
        (Opcode::Str, vec![reg("rsp"), Operand::imm(0), reg("rbp")]),
        (Opcode::Mov, vec![reg("rbp"), reg("rsp")]),
        (Opcode::Sub, vec![reg("rsp"), Operand::imm(16)]),
        (Opcode::Str, vec![reg("rbp"), Operand::imm(-8), reg("rdi")]),
        (Opcode::Str, vec![reg("rbp"), Operand::imm(-16), reg("esi")]),
        (Opcode::Mov, vec![reg("rdi"), Operand::imm(0)]),
        (Opcode::Ldd, vec![reg("rax"), reg("rbp"), Operand::imm(-8)]),
        (Opcode::Ldd, vec![reg("ecx"), reg("rbp"), Operand::imm(-16)]),
        (Opcode::Add, vec![reg("rsp"), Operand::imm(16)]),
        (Opcode::Ldd, vec![reg("rbp"), reg("rsp"), Operand::imm(0)]),
        (Opcode::Add, vec![reg("rsp"), Operand::imm(8)]),
    ]);
    let vm = run(&block);

    let initial = |name: &str| {
        let register = register(name);
        SymbolicBitVec::tagged(
            register.base().tag(),
            register.bit_offset() as usize,
            register.bit_count() as usize,
        )
    };

    assert_eq!(vm.read_register(&register("rax")), initial("rdi"));
    assert_eq!(vm.read_register(&register("rcx")), initial("esi").resize(64));
    assert_eq!(vm.read_register(&register("rbp")), initial("rbp"));
    assert_eq!(read_register::<u64>(&vm, "rdi"), 0);
}

#[test]
fn increment_byte_in_memory() {
    let block = assemble([
        (Opcode::Mov, vec![reg("rbx"), Operand::imm(0x2000)]),
        (Opcode::Mov, vec![reg("al"), Operand::imm(0x41)]),
        (Opcode::Str, vec![reg("rbx"), Operand::imm(3), reg("al")]),
        (Opcode::Ldd, vec![reg("dl"), reg("rbx"), Operand::imm(3)]),
        (Opcode::Add, vec![reg("dl"), Operand::imm(1)]),
        (Opcode::Str, vec![reg("rbx"), Operand::imm(3), reg("dl")]),
        (Opcode::Ldd, vec![reg("cx"), reg("rbx"), Operand::imm(3)]),
    ]);
    let vm = run(&block);

    let dl: u8 = read_register(&vm, "dl");
    assert_eq!(dl, 0x42);

    // The byte after the stored one was never written
    let cx = vm.read_register(&register("cx"));
    let parts = cx.into_parts(8);
    assert_eq!(u8::try_from(&parts[0]), Ok(0x42));
    assert!(parts[1].contains_variable());
}

#[test]
fn dump_state() {
    let block = assemble([
        (Opcode::Mov, vec![reg("ecx"), Operand::imm(0x10)]),
        (Opcode::Mov, vec![reg("ah"), Operand::imm(0x7f)]),
        (Opcode::Str, vec![reg("rsp"), Operand::imm(-4), reg("ecx")]),
    ]);
    let vm = run(&block);

    let dump = vm.dump_state();
    let lines: Vec<_> = dump.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("rax := rax[16..64] . 0x7f:8 . rax[0..8]"));
    assert_eq!(lines[1], "rcx := 0x10");
    assert_eq!(lines[2], "[rsp[0..64] - 0x4] := 0x10");
}
