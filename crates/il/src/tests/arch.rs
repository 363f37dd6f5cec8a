use crate::arch::{amd64::*, Architecture, Error, PartialWrite, RegisterId, RegisterMapping, Result};
use crate::register::RegisterDesc;

#[test]
fn resolve_sub_registers() -> Result<()> {
    let table = Amd64.registers();
    assert_eq!(table.resolve(EAX)?, RegisterMapping::new(RAX, 0, 4));
    assert_eq!(table.resolve(AH)?, RegisterMapping::new(RAX, 1, 1));
    assert_eq!(table.resolve(R9W)?, RegisterMapping::new(R9, 0, 2));
    assert_eq!(table.resolve(EFLAGS)?, RegisterMapping::new(EFLAGS, 0, 8));
    Ok(())
}

#[test]
fn resolve_unknown_register() -> Result<()> {
    let table = Amd64.registers();
    assert_eq!(table.resolve(RIP)?, RegisterMapping::new(RIP, 0, 8));
    assert_eq!(table.base_of(RIP), RIP);
    Ok(())
}

#[test]
fn resolve_invalid_register() {
    let table = Amd64.registers();
    assert_eq!(table.resolve(RegisterId::INVALID), Err(Error::InvalidRegister));
    assert_eq!(table.base_of(RegisterId::INVALID), RegisterId::INVALID);
}

#[test]
fn base_of_sub_registers() {
    let table = Amd64.registers();
    assert_eq!(table.base_of(AL), RAX);
    assert_eq!(table.base_of(SPL), RSP);
    assert_eq!(table.base_of(R15D), R15);
    assert_eq!(table.base_of(RBX), RBX);
}

#[test]
fn table_size() {
    // 4 families with a high byte, 12 without and the flags register
    assert_eq!(Amd64.registers().len(), 4 * 5 + 12 * 4 + 1);
}

#[test]
fn remap_full_width_is_identity() -> Result<()> {
    let table = Amd64.registers();
    for (id, mapping) in table.iter() {
        if mapping.base == id {
            assert_eq!(table.remap(id, 0, 8)?, id, "{}", Amd64.register_name(id));
        }
    }

    Ok(())
}

#[test]
fn remap_inverts_resolve() -> Result<()> {
    let table = Amd64.registers();
    for (id, _) in table.iter() {
        let mapping = table.resolve(id)?;
        assert_eq!(
            table.remap(mapping.base, mapping.offset, mapping.size)?,
            id,
            "{}",
            Amd64.register_name(id)
        );
    }

    Ok(())
}

#[test]
fn remap_through_sub_register() -> Result<()> {
    let table = Amd64.registers();
    assert_eq!(table.remap(EAX, 1, 1)?, AH);
    assert_eq!(table.remap(DL, 0, 4)?, EDX);
    Ok(())
}

#[test]
fn remap_unnamed_slice() -> Result<()> {
    let table = Amd64.registers();

    // Falls back to the base register at offset zero
    assert_eq!(table.remap(RSI, 0, 3)?, RSI);
    assert_eq!(table.remap(RIP, 0, 4)?, RIP);

    assert_eq!(
        table.remap(RDI, 1, 1),
        Err(Error::UnmappedRegister {
            base: RDI,
            offset: 1,
            size: 1
        })
    );
    Ok(())
}

#[test]
fn register_names() {
    assert_eq!(Amd64.register_name(RAX), "rax");
    assert_eq!(Amd64.register_name(R10B), "r10b");
    assert_eq!(Amd64.register_name(RIP), "rip");
    assert_eq!(Amd64.register_name(RegisterId(999)), "reg999");
}

#[test]
fn restricted_registers() {
    assert!(Amd64.is_restricted(RSP));
    assert!(!Amd64.is_restricted(RBP));
    assert!(!Amd64.is_restricted(RAX));
}

#[test]
fn partial_write_policy() -> Result<()> {
    let table = Amd64.registers();
    let policy = |id| -> Result<PartialWrite> {
        Ok(Amd64.partial_write(&RegisterDesc::from_register(table, id)?))
    };

    assert_eq!(policy(EAX)?, PartialWrite::ZeroExtend);
    assert_eq!(policy(R12D)?, PartialWrite::ZeroExtend);
    assert_eq!(policy(AX)?, PartialWrite::Merge);
    assert_eq!(policy(AH)?, PartialWrite::Merge);
    assert_eq!(policy(AL)?, PartialWrite::Merge);

    let flags = RegisterDesc::new(table, EFLAGS, 0, 32)?;
    assert_eq!(Amd64.partial_write(&flags), PartialWrite::Merge);
    Ok(())
}

#[test]
fn register_tags() {
    assert_eq!(RegisterId::from_tag(RAX.tag()), Some(RAX));
    assert_eq!(RegisterId::from_tag(usize::MAX), None);
}

#[test]
fn lookup_by_name() {
    assert_eq!(register_from_name("R11W"), Some(R11W));
    assert_eq!(register_from_name("spl"), Some(SPL));
    assert_eq!(register_from_name("xmm0"), None);
}
