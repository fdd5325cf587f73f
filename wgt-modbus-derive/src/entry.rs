use crate::utils::{expr_assign_predicate, get_punctuated, panic_no_key, panic_not_literal};
use proc_macro2::{Ident, Span, TokenStream};
use quote::ToTokens;
use syn::{punctuated::Punctuated, token::Comma, Expr, ExprAssign, Field, Lit, Type};

#[derive(Debug, Clone)]
/// Single entry in modbus register mapping. Parsed from field attributes and to be used in proc macros
pub struct Entry {
    pub field_name: String,
    pub field_ty: String,
    pub addr: Expr,
    pub x: ScaleFactor,
    pub unit: String,
    pub access: Access,
}

pub type ScaleFactor = f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    ReadWrite,
}

impl From<String> for Access {
    fn from(value: String) -> Self {
        match value.as_str() {
            "r" => Access::Read,
            "rw" => Access::ReadWrite,
            s => panic!(
                "Invalid `access` variant \"{s}\". Use \"r\" for read-only or \"rw\" for read-write registers."
            ),
        }
    }
}

impl From<Field> for Entry {
    fn from(value: Field) -> Self {
        let field_name = value
            .ident
            .unwrap_or_else(|| panic!("Unexpected unnamed struct field."))
            .to_string();

        let field_ty = match value.ty {
            Type::Path(type_path) => type_path
                .path
                .get_ident()
                .unwrap_or_else(|| panic!("Unexpected no ident for `{field_name}` field type."))
                .to_string(),
            _ => panic!("Unexpected `syn::Type` variant in `{field_name}` field."),
        };

        let attr = value
            .attrs
            .iter()
            .find(|attr| attr.path().is_ident("modbus"))
            .unwrap_or_else(|| {
                panic!("Unexpected missing attribute `modbus` for `{field_name}` field.")
            })
            .clone();
        let punctuated = get_punctuated(&attr, &field_name);

        let addr = Self::get_addr(&punctuated, &field_name);
        let x = Self::get_x(&punctuated, &field_name);
        let unit = Self::get_unit(&punctuated, &field_name);
        let access = Self::get_access(&punctuated, &field_name);

        Self {
            field_name,
            field_ty,
            addr,
            x,
            unit,
            access,
        }
    }
}

impl Entry {
    // Macro helpers

    pub fn field_name_ident(&self) -> Ident {
        Ident::new(&self.field_name, Span::call_site())
    }

    pub fn field_ty_ident(&self) -> Ident {
        Ident::new(&self.field_ty, Span::call_site())
    }

    pub fn addr_tokens(&self) -> TokenStream {
        self.addr.to_token_stream()
    }

    /// Address as written in the attribute, e.g. `209` or `address::OUTSIDE_TEMPERATURE`.
    pub fn addr_string(&self) -> String {
        self.addr.to_token_stream().to_string().replace(' ', "")
    }

    pub fn is_writable(&self) -> bool {
        self.access == Access::ReadWrite
    }

    pub fn update_method_ident(&self) -> Ident {
        let name = format!("update_{}", self.field_name);
        Ident::new(&name, Span::call_site())
    }

    // Parsing helpers

    fn get_addr(punctuated: &Punctuated<ExprAssign, Comma>, field_name: &str) -> Expr {
        let addr = punctuated
            .iter()
            .filter(expr_assign_predicate("addr", field_name))
            .map(|expr_assign| *expr_assign.right.clone())
            .next()
            .unwrap_or_else(|| panic_no_key("addr", field_name));

        match &addr {
            Expr::Lit(right) => match &right.lit {
                Lit::Int(lit_int) => {
                    lit_int.base10_parse::<u16>().unwrap_or_else(|_| panic!("In `modbus` attribute for `{field_name}`, the key `addr` could not be parsed to u16."));
                }
                _ => panic_not_literal("addr", "integer", field_name),
            },
            Expr::Path(_) => {}
            _ => panic!(
                "In `modbus` attribute for `{field_name}`, the key `addr` is neither an integer literal nor a path."
            ),
        }

        addr
    }

    fn get_x(punctuated: &Punctuated<ExprAssign, Comma>, field_name: &str) -> ScaleFactor {
        punctuated
                    .iter()
                    .filter(expr_assign_predicate("x", field_name))
                    .map(|expr_assign| match *expr_assign.right.clone() {
                        Expr::Lit(right) => match right.lit {
                            Lit::Float(lit_float) => lit_float,
                            _ => panic_not_literal("x", "float", field_name)
                        },
                        _ => panic_not_literal("x", "float", field_name)
                    })
                    .next()
                    .map(|lit_float| lit_float.base10_parse::<ScaleFactor>()
                        .unwrap_or_else(|_| panic!("In `modbus` attribute for `{field_name}`, the key `x` could not be parsed to f64.")))
                    .unwrap_or(1.0)
    }

    fn get_unit(punctuated: &Punctuated<ExprAssign, Comma>, field_name: &str) -> String {
        Self::get_str(punctuated, "unit", field_name).unwrap_or_default()
    }

    fn get_access(punctuated: &Punctuated<ExprAssign, Comma>, field_name: &str) -> Access {
        Self::get_str(punctuated, "access", field_name)
            .map(Access::from)
            .unwrap_or(Access::ReadWrite)
    }

    fn get_str(
        punctuated: &Punctuated<ExprAssign, Comma>,
        key: &str,
        field_name: &str,
    ) -> Option<String> {
        punctuated
            .iter()
            .filter(expr_assign_predicate(key, field_name))
            .map(|expr_assign| match *expr_assign.right.clone() {
                Expr::Lit(right) => match right.lit {
                    Lit::Str(lit_str) => lit_str.value(),
                    _ => panic_not_literal(key, "string", field_name),
                },
                _ => panic_not_literal(key, "string", field_name),
            })
            .next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn parses_all_keys() {
        let field: Field = parse_quote! {
            #[modbus(addr = 209, x = 0.1, unit = "°C", access = "r")]
            pub outside_temperature: f64
        };
        let entry = Entry::from(field);
        assert_eq!(entry.field_name, "outside_temperature");
        assert_eq!(entry.field_ty, "f64");
        assert_eq!(entry.addr_string(), "209");
        assert_eq!(entry.x, 0.1);
        assert_eq!(entry.unit, "°C");
        assert!(!entry.is_writable());
    }

    #[test]
    fn optional_keys_have_defaults() {
        let field: Field = parse_quote! {
            #[modbus(addr = address::OPERATING_MODE)]
            pub operating_mode: OperatingMode
        };
        let entry = Entry::from(field);
        assert_eq!(entry.addr_string(), "address::OPERATING_MODE");
        assert_eq!(entry.x, 1.0);
        assert_eq!(entry.unit, "");
        assert!(entry.is_writable());
        assert_eq!(entry.update_method_ident().to_string(), "update_operating_mode");
    }

    #[test]
    #[should_panic(expected = "no key `addr`")]
    fn missing_address_panics() {
        let field: Field = parse_quote! {
            #[modbus(x = 0.1)]
            pub temperature: f64
        };
        let _ = Entry::from(field);
    }

    #[test]
    #[should_panic(expected = "Invalid `access` variant")]
    fn invalid_access_panics() {
        let field: Field = parse_quote! {
            #[modbus(addr = 1, access = "w")]
            pub flag: bool
        };
        let _ = Entry::from(field);
    }
}
