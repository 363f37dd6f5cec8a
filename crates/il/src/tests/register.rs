use crate::arch::{amd64::*, Architecture, Error, Result};
use crate::register::RegisterDesc;

use super::reg;

#[test]
fn from_register() {
    let ah = reg(AH);
    assert_eq!(ah.base(), RAX);
    assert_eq!(ah.bit_offset(), 8);
    assert_eq!(ah.bit_count(), 8);

    let eflags = reg(EFLAGS);
    assert!(eflags.is_full());
}

#[test]
fn to_register() -> Result<()> {
    let table = Amd64.registers();
    assert_eq!(reg(AH).to_register(table)?, AH);
    assert_eq!(reg(R8W).to_register(table)?, R8W);
    assert_eq!(RegisterDesc::new(table, RBX, 0, 32)?.to_register(table)?, EBX);
    Ok(())
}

#[test]
fn to_register_unaligned() -> Result<()> {
    let table = Amd64.registers();
    let desc = RegisterDesc::new(table, RCX, 4, 8)?;
    assert!(matches!(
        desc.to_register(table),
        Err(Error::UnmappedRegister { base: RCX, .. })
    ));
    Ok(())
}

#[test]
fn invalid_descriptors() {
    let table = Amd64.registers();
    assert_eq!(
        RegisterDesc::new(table, RAX, 60, 8),
        Err(Error::InvalidBitRange {
            base: RAX,
            bit_offset: 60,
            bit_count: 8
        })
    );
    assert!(RegisterDesc::new(table, RAX, 0, 0).is_err());
    assert!(RegisterDesc::new(table, RAX, u32::MAX, 2).is_err());
    assert_eq!(
        RegisterDesc::new(table, crate::arch::RegisterId::INVALID, 0, 64),
        Err(Error::InvalidRegister)
    );
}

#[test]
fn sub_register_is_not_a_base() -> Result<()> {
    let table = Amd64.registers();
    assert_eq!(
        RegisterDesc::new(table, EAX, 0, 32),
        Err(Error::NotBaseRegister {
            register: EAX,
            base: RAX
        })
    );
    assert!(RegisterDesc::new(table, AH, 0, 8).is_err());

    // The same bits named through the base register are accepted
    let desc = RegisterDesc::new(table, RAX, 0, 32)?;
    assert_eq!(desc, reg(EAX));
    assert_eq!(desc.canonical(), reg(RAX));
    Ok(())
}

#[test]
fn overlaps() {
    assert!(!reg(AL).overlaps(&reg(AH)));
    assert!(reg(AX).overlaps(&reg(AH)));
    assert!(reg(AH).overlaps(&reg(RAX)));
    assert!(reg(EAX).overlaps(&reg(AL)));
    assert!(!reg(EAX).overlaps(&reg(EBX)));
}

#[test]
fn mask() -> Result<()> {
    assert_eq!(reg(AH).mask(), 0xFF00);
    assert_eq!(reg(EAX).mask(), 0xFFFF_FFFF);
    assert_eq!(reg(RAX).mask(), u64::MAX);
    assert_eq!(RegisterDesc::new(Amd64.registers(), RAX, 63, 1)?.mask(), 1 << 63);
    Ok(())
}

#[test]
fn canonical() {
    assert_eq!(reg(AH).canonical(), reg(RAX));
    assert_eq!(reg(SIL).canonical(), reg(RSI));
}

#[test]
fn render() -> Result<()> {
    let table = Amd64.registers();
    assert_eq!(reg(AH).render(&Amd64), "ah");
    assert_eq!(reg(R13D).render(&Amd64), "r13d");
    assert_eq!(reg(RIP).render(&Amd64), "rip");
    assert_eq!(RegisterDesc::new(table, RAX, 4, 3)?.render(&Amd64), "rax[4..7]");
    assert_eq!(RegisterDesc::new(table, RDI, 8, 8)?.render(&Amd64), "rdi[8..16]");
    Ok(())
}
