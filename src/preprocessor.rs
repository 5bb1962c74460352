//! On isleme: yorumlar ve '#' satirlari cikarilir, satir sayisi korunur.

/// `//` satir yorumlarini, `/* ... */` blok yorumlarini ve `#` ile
/// baslayan satirlari atar. Blok yorum icindeki satir sonlari cikti da
/// korunur ki token satir numaralari kaynakla eslessin. Sonda satir sonu
/// yoksa eklenir.
pub fn preprocess(code: &str) -> String {
    let bytes = code.as_bytes();
    let mut out: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut cursor = 0usize;

    while cursor < bytes.len() {
        if bytes[cursor..].starts_with(b"//") {
            while cursor < bytes.len() && bytes[cursor] != b'\n' {
                cursor += 1;
            }
        } else if bytes[cursor..].starts_with(b"/*") {
            cursor += 2;
            while cursor < bytes.len() && !bytes[cursor..].starts_with(b"*/") {
                if bytes[cursor] == b'\n' {
                    out.push(b'\n');
                }
                cursor += 1;
            }
            // kapanista kaynak bitmis olabilir
            cursor = (cursor + 2).min(bytes.len());
            continue;
        } else if bytes[cursor] == b'#' {
            while cursor < bytes.len() && bytes[cursor] != b'\n' {
                cursor += 1;
            }
        }

        if cursor < bytes.len() {
            out.push(bytes[cursor]);
            cursor += 1;
        }
    }

    if out.last() != Some(&b'\n') {
        out.push(b'\n');
    }

    // yorumlar tam UTF-8 karakter sinirlarinda biter; lossy hic tetiklenmez
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_comments_keeping_newline() {
        let out = preprocess("int x = 1; // comment\nint y = 2;\n");
        assert_eq!(out, "int x = 1; \nint y = 2;\n");
    }

    #[test]
    fn strips_block_comments_preserving_line_count() {
        let src = "int a = 1; /* one\ntwo\nthree */ int b = 2;\n";
        let out = preprocess(src);
        assert_eq!(out.matches('\n').count(), src.matches('\n').count());
        assert!(!out.contains("one"));
        assert!(!out.contains("*/"));
        assert!(out.contains("int b = 2;"));
    }

    #[test]
    fn strips_directive_lines() {
        let out = preprocess("#include <x>\nint a = 1;\n");
        assert_eq!(out, "\nint a = 1;\n");
    }

    #[test]
    fn appends_trailing_newline() {
        assert_eq!(preprocess("int a = 1;"), "int a = 1;\n");
    }

    #[test]
    fn unterminated_block_comment_does_not_hang() {
        let out = preprocess("int a = 1; /* open\nmore");
        assert!(out.contains("int a = 1;"));
        assert!(!out.contains("more"));
    }
}
