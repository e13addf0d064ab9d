/// Type tags pushed on the type stack during parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ty {
    None,
    Subroutine,
    Integer,
    Char,
    Boolean,
    ArrayInteger,
    ArrayChar,
    ArrayBoolean,
}

impl Ty {
    pub fn is_scalar(self) -> bool {
        matches!(self, Ty::Integer | Ty::Char | Ty::Boolean)
    }

    pub fn is_array(self) -> bool {
        matches!(self, Ty::ArrayInteger | Ty::ArrayChar | Ty::ArrayBoolean)
    }

    pub fn to_array(self) -> Option<Ty> {
        match self {
            Ty::Integer => Some(Ty::ArrayInteger),
            Ty::Char => Some(Ty::ArrayChar),
            Ty::Boolean => Some(Ty::ArrayBoolean),
            _ => None,
        }
    }

    pub fn element(self) -> Option<Ty> {
        match self {
            Ty::ArrayInteger => Some(Ty::Integer),
            Ty::ArrayChar => Some(Ty::Char),
            Ty::ArrayBoolean => Some(Ty::Boolean),
            _ => None,
        }
    }
}

/// Full descriptor of one declared identifier. Index bounds are meaningful
/// for arrays only; params for subroutines only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeData {
    pub ty: Ty,
    pub params: Vec<Ty>,
    pub index_min: i32,
    pub index_max: i32,
}

impl TypeData {
    pub fn scalar(ty: Ty) -> Self {
        Self {
            ty,
            params: Vec::new(),
            index_min: 0,
            index_max: 0,
        }
    }

    pub fn array(ty: Ty, index_min: i32, index_max: i32) -> Self {
        Self {
            ty,
            params: Vec::new(),
            index_min,
            index_max,
        }
    }

    pub fn subroutine(params: Vec<Ty>) -> Self {
        Self {
            ty: Ty::Subroutine,
            params,
            index_min: 0,
            index_max: 0,
        }
    }

    /// Number of machine words the identifier occupies.
    pub fn size(&self) -> i32 {
        if self.ty.is_array() {
            self.index_max - self.index_min + 1
        } else {
            1
        }
    }
}
