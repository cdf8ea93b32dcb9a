//! ALU implementation

/// Sign-extends a 16-bit immediate
pub fn sign_extend16(imm: u16) -> u32 {
    imm as i16 as i32 as u32
}

/// Zero-extends a 16-bit immediate
pub fn zero_extend16(imm: u16) -> u32 {
    imm as u32
}

/// Sign-extends the low byte of a word
pub fn sign_extend8(value: u32) -> u32 {
    value as u8 as i8 as i32 as u32
}

pub fn shift_left_logical(value: u32, sa: u32) -> u32 {
    value.wrapping_shl(sa)
}

pub fn shift_right_logical(value: u32, sa: u32) -> u32 {
    value.wrapping_shr(sa)
}

/// Replicates the sign bit into the vacated positions
pub fn shift_right_arithmetic(value: u32, sa: u32) -> u32 {
    (value as i32).wrapping_shr(sa) as u32
}

/// Performs a register-register ALU operation.
/// ADD and SUB never trap on overflow.
pub fn alu(op: ALUOp, op1: u32, op2: u32) -> u32 {
    match op {
        ALUOp::ADD | ALUOp::ADDU => op1.wrapping_add(op2),
        ALUOp::SUB | ALUOp::SUBU => op1.wrapping_sub(op2),
        ALUOp::AND => op1 & op2,
        ALUOp::OR => op1 | op2,
        ALUOp::XOR => op1 ^ op2,
        ALUOp::NOR => !(op1 | op2),
        ALUOp::SLT => ((op1 as i32) < (op2 as i32)) as u32,
    }
}

/// Performs a register-immediate ALU operation
pub fn alu_imm(op: ImmOp, op1: u32, imm: u16) -> u32 {
    match op {
        ImmOp::ADDI | ImmOp::ADDIU => op1.wrapping_add(sign_extend16(imm)),
        // Negative difference, not a true signed compare
        ImmOp::SLTI => ((op1.wrapping_sub(sign_extend16(imm)) as i32) < 0) as u32,
        ImmOp::ANDI => op1 & zero_extend16(imm),
        ImmOp::ORI => op1 | zero_extend16(imm),
        ImmOp::XORI => op1 ^ zero_extend16(imm),
    }
}

/// Signed 32x32 -> 64 product
pub fn mult(op1: u32, op2: u32) -> u64 {
    ((op1 as i32 as i64) * (op2 as i32 as i64)) as u64
}

/// Unsigned 32x32 -> 64 product
pub fn multu(op1: u32, op2: u32) -> u64 {
    (op1 as u64) * (op2 as u64)
}

/// Signed (quotient, remainder), `None` on a zero divisor
pub fn div(op1: u32, op2: u32) -> Option<(u32, u32)> {
    if op2 == 0 {
        return None;
    }
    let (n, d) = (op1 as i32, op2 as i32);
    Some((n.wrapping_div(d) as u32, n.wrapping_rem(d) as u32))
}

/// Unsigned (quotient, remainder), `None` on a zero divisor
pub fn divu(op1: u32, op2: u32) -> Option<(u32, u32)> {
    if op2 == 0 {
        return None;
    }
    Some((op1 / op2, op1 % op2))
}

/// Register-register operations (R-type, function field)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ALUOp {
    // Arithmetic
    ADD,
    ADDU,
    SUB,
    SUBU,
    // Logical
    AND,
    OR,
    XOR,
    NOR,
    // Set
    SLT,
}

/// Register-immediate operations (I-type, opcode field)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImmOp {
    ADDI,
    ADDIU,
    SLTI,
    ANDI,
    ORI,
    XORI,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions() {
        assert_eq!(sign_extend16(0x7fff), 0x0000_7fff);
        assert_eq!(sign_extend16(0x8000), 0xffff_8000);
        assert_eq!(sign_extend16(0xffff), 0xffff_ffff);
        assert_eq!(zero_extend16(0xffff), 0x0000_ffff);
        assert_eq!(sign_extend8(0x1234_5680), 0xffff_ff80);
        assert_eq!(sign_extend8(0x1234_567f), 0x0000_007f);
    }

    #[test]
    fn test_shifts() {
        assert_eq!(shift_left_logical(0x8000_0001, 1), 0x0000_0002);
        assert_eq!(shift_right_logical(0x8000_0000, 4), 0x0800_0000);
        assert_eq!(shift_right_arithmetic(0x8000_0000, 4), 0xf800_0000);
        assert_eq!(shift_right_arithmetic(0x4000_0000, 4), 0x0400_0000);
        assert_eq!(shift_right_arithmetic(0xffff_fff0, 0), 0xffff_fff0);
    }

    #[test]
    fn test_alu_no_overflow_trap() {
        assert_eq!(alu(ALUOp::ADD, 0x7fff_ffff, 1), 0x8000_0000);
        assert_eq!(alu(ALUOp::SUB, 0, 1), 0xffff_ffff);
        assert_eq!(alu(ALUOp::SUBU, 5, 3), 2);
    }

    #[test]
    fn test_alu_logic() {
        assert_eq!(alu(ALUOp::AND, 0b1100, 0b1010), 0b1000);
        assert_eq!(alu(ALUOp::OR, 0b1100, 0b1010), 0b1110);
        assert_eq!(alu(ALUOp::XOR, 0b1100, 0b1010), 0b0110);
        assert_eq!(alu(ALUOp::NOR, 0, 0), 0xffff_ffff);
    }

    #[test]
    fn test_slt_is_signed() {
        assert_eq!(alu(ALUOp::SLT, 0xffff_ffff, 1), 1);
        assert_eq!(alu(ALUOp::SLT, 1, 0xffff_ffff), 0);
        assert_eq!(alu(ALUOp::SLT, 3, 3), 0);
    }

    #[test]
    fn test_alu_imm() {
        assert_eq!(alu_imm(ImmOp::ADDI, 10, 0xfffe), 8);
        assert_eq!(alu_imm(ImmOp::ADDIU, 0, 5), 5);
        assert_eq!(alu_imm(ImmOp::ANDI, 0xffff_ffff, 0x8001), 0x8001);
        assert_eq!(alu_imm(ImmOp::ORI, 0xffff_0000, 0x8000), 0xffff_8000);
        assert_eq!(alu_imm(ImmOp::XORI, 0x0000_ffff, 0xffff), 0);
        assert_eq!(alu_imm(ImmOp::SLTI, 3, 5), 1);
        assert_eq!(alu_imm(ImmOp::SLTI, 5, 3), 0);
        assert_eq!(alu_imm(ImmOp::SLTI, 0xffff_fffb, 0xfffe), 1);
    }

    #[test]
    fn test_mult() {
        assert_eq!(mult(0xffff_ffff, 2), 0xffff_ffff_ffff_fffe);
        assert_eq!(multu(0xffff_ffff, 2), 0x0000_0001_ffff_fffe);
        assert_eq!(mult(0x8000_0000, 0x8000_0000), 0x4000_0000_0000_0000);
    }

    #[test]
    fn test_div() {
        assert_eq!(div(7, 2), Some((3, 1)));
        assert_eq!(div((-7i32) as u32, 2), Some(((-3i32) as u32, (-1i32) as u32)));
        assert_eq!(div(0x8000_0000, 0xffff_ffff), Some((0x8000_0000, 0)));
        assert_eq!(divu(0xffff_fff9, 2), Some((0x7fff_fffc, 1)));
        assert_eq!(div(1, 0), None);
        assert_eq!(divu(1, 0), None);
    }
}
