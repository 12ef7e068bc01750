//! Conversion between a script's raw byte (`hex`) form and its human
//! readable (`asm`) form, shared by the entity model's asm/hex mutual-fill
//! contract and the Script VM's decoder.

const OP_PUSHDATA1: u8 = 0x4c;
const OP_PUSHDATA2: u8 = 0x4d;
const OP_PUSHDATA4: u8 = 0x4e;
const OP_1NEGATE: u8 = 0x4f;
const OP_1: u8 = 0x51;
const OP_16: u8 = 0x60;

const NAMED_OPCODES: &[(u8, &str)] = &[
    (0x61, "OP_NOP"),
    (0x69, "OP_VERIFY"),
    (0x6a, "OP_RETURN"),
    (0x6b, "OP_TOALTSTACK"),
    (0x6c, "OP_FROMALTSTACK"),
    (0x6d, "OP_2DROP"),
    (0x6e, "OP_2DUP"),
    (0x6f, "OP_3DUP"),
    (0x75, "OP_DROP"),
    (0x76, "OP_DUP"),
    (0x78, "OP_OVER"),
    (0x7b, "OP_ROT"),
    (0x7c, "OP_SWAP"),
    (0x87, "OP_EQUAL"),
    (0x88, "OP_EQUALVERIFY"),
    (0x8b, "OP_1ADD"),
    (0x8c, "OP_1SUB"),
    (0x8f, "OP_NEGATE"),
    (0x90, "OP_ABS"),
    (0x91, "OP_NOT"),
    (0x92, "OP_0NOTEQUAL"),
    (0x93, "OP_ADD"),
    (0x94, "OP_SUB"),
    (0x9a, "OP_BOOLAND"),
    (0x9b, "OP_BOOLOR"),
    (0x9c, "OP_NUMEQUAL"),
    (0x9d, "OP_NUMEQUALVERIFY"),
    (0x9f, "OP_LESSTHAN"),
    (0xa0, "OP_GREATERTHAN"),
    (0xa3, "OP_MIN"),
    (0xa4, "OP_MAX"),
    (0xa6, "OP_RIPEMD160"),
    (0xa7, "OP_SHA1"),
    (0xa8, "OP_SHA256"),
    (0xa9, "OP_HASH160"),
    (0xaa, "OP_HASH256"),
    (0xac, "OP_CHECKSIG"),
    (0xad, "OP_CHECKSIGVERIFY"),
    (0xb0, "OP_NOP1"),
    (0xb1, "OP_NOP2"),
    (0xb2, "OP_NOP3"),
    (0xb3, "OP_NOP4"),
    (0xb4, "OP_NOP5"),
    (0xb5, "OP_NOP6"),
    (0xb6, "OP_NOP7"),
    (0xb7, "OP_NOP8"),
    (0xb8, "OP_NOP9"),
    (0xb9, "OP_NOP10"),
];

fn opcode_name(byte: u8) -> Option<&'static str> {
    NAMED_OPCODES.iter().find(|(b, _)| *b == byte).map(|(_, n)| *n)
}

fn opcode_byte(name: &str) -> Option<u8> {
    NAMED_OPCODES.iter().find(|(_, n)| *n == name).map(|(b, _)| *b)
}

/// Disassemble raw script bytes into a space-separated asm string.
pub fn script_to_asm(script: &[u8]) -> Result<String, String> {
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < script.len() {
        let op = script[i];
        match op {
            0x00 => {
                tokens.push("0".to_string());
                i += 1;
            }
            1..=0x4b => {
                let len = op as usize;
                let data = script.get(i + 1..i + 1 + len).ok_or("truncated push")?;
                tokens.push(hex::encode(data));
                i += 1 + len;
            }
            OP_PUSHDATA1 => {
                let len = *script.get(i + 1).ok_or("truncated PUSHDATA1 length")? as usize;
                let data = script.get(i + 2..i + 2 + len).ok_or("truncated PUSHDATA1 data")?;
                tokens.push(hex::encode(data));
                i += 2 + len;
            }
            OP_PUSHDATA2 => {
                let len_bytes = script.get(i + 1..i + 3).ok_or("truncated PUSHDATA2 length")?;
                let len = u16::from_le_bytes(len_bytes.try_into().unwrap()) as usize;
                let data = script.get(i + 3..i + 3 + len).ok_or("truncated PUSHDATA2 data")?;
                tokens.push(hex::encode(data));
                i += 3 + len;
            }
            OP_PUSHDATA4 => {
                let len_bytes = script.get(i + 1..i + 5).ok_or("truncated PUSHDATA4 length")?;
                let len = u32::from_le_bytes(len_bytes.try_into().unwrap()) as usize;
                let data = script.get(i + 5..i + 5 + len).ok_or("truncated PUSHDATA4 data")?;
                tokens.push(hex::encode(data));
                i += 5 + len;
            }
            OP_1NEGATE => {
                tokens.push("-1".to_string());
                i += 1;
            }
            n if n >= OP_1 && n <= OP_16 => {
                tokens.push((n - OP_1 + 1).to_string());
                i += 1;
            }
            other => {
                let name = opcode_name(other).ok_or_else(|| format!("unknown opcode 0x{other:02x}"))?;
                tokens.push(name.to_string());
                i += 1;
            }
        }
    }
    Ok(tokens.join(" "))
}

/// Assemble an asm string back into raw script bytes.
pub fn asm_to_script(asm: &str) -> Result<Vec<u8>, String> {
    let mut out = Vec::new();
    for token in asm.split_whitespace() {
        if token == "0" {
            out.push(0x00);
            continue;
        }
        if token == "-1" {
            out.push(OP_1NEGATE);
            continue;
        }
        if let Ok(n) = token.parse::<i64>() {
            if (1..=16).contains(&n) {
                out.push(OP_1 + (n as u8 - 1));
                continue;
            }
        }
        if let Some(byte) = opcode_byte(token) {
            out.push(byte);
            continue;
        }
        if token.len() % 2 == 0 && token.chars().all(|c| c.is_ascii_hexdigit()) {
            let data = hex::decode(token).map_err(|_| format!("bad hex token: {token}"))?;
            push_data(&mut out, &data);
            continue;
        }
        return Err(format!("unrecognized asm token: {token}"));
    }
    Ok(out)
}

fn push_data(out: &mut Vec<u8>, data: &[u8]) {
    if data.len() <= 75 {
        out.push(data.len() as u8);
    } else if data.len() <= 0xff {
        out.push(OP_PUSHDATA1);
        out.push(data.len() as u8);
    } else if data.len() <= 0xffff {
        out.push(OP_PUSHDATA2);
        out.extend_from_slice(&(data.len() as u16).to_le_bytes());
    } else {
        out.push(OP_PUSHDATA4);
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    }
    out.extend_from_slice(data);
}
