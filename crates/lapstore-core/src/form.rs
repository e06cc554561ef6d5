//! Product editor state.
//!
//! [`ProductForm`] holds everything the seller has typed so far. It changes
//! only through [`ProductForm::apply`], a pure reducer over [`FormAction`], and
//! turns into a [`ProductFields`] payload through [`ProductForm::assemble`].

use crate::condition::{ConditionDetails, LaptopCondition, OverallCondition};
use crate::gallery::{Gallery, GalleryLimits, ImageFile, ImageRejection};
use crate::gifts::{self, FreeGift};
use crate::product::{
    AccessoryDetails, Availability, Condition, LaptopDetails, Product, ProductFields,
    ProductImages, ProductKind, ProductType,
};
use crate::specs::{DetailedSpecs, UpgradeKind};
use crate::validation::{self, ValidationError};

#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    SetName(String),
    SetSpecs(String),
    SetPrice(String),
    SetOriginalPrice(String),
    /// Raw discount text; parsed on assemble.
    SetDiscount(String),
    SetType(ProductType),
    SetCategory(String),
    SetCondition(Option<Condition>),
    SetWarranty(String),
    SetAvailability(Availability),
    SetFeatured(bool),
    SetDetailedSpecs(DetailedSpecs),
    AddUpgradeOption(UpgradeKind, String),
    RemoveUpgradeOption(UpgradeKind, String),
    SetOverallCondition(OverallCondition),
    SetConditionDetails(ConditionDetails),
    ClearLaptopCondition,
    TogglePresetGift(FreeGift),
    AddCustomGift(FreeGift),
    RemoveGift(String),
    AddImages(Vec<ImageFile>),
    RemoveImage(usize),
    SetPrimaryImage(usize),
    DismissImageErrors,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    name: String,
    specs: String,
    price: String,
    original_price: String,
    discount: String,
    product_type: ProductType,
    category: String,
    condition: Option<Condition>,
    warranty: String,
    availability: Availability,
    featured: bool,
    detailed_specs: DetailedSpecs,
    laptop_condition: Option<LaptopCondition>,
    free_gifts: Vec<FreeGift>,
    gallery: Gallery,
    image_errors: Vec<ImageRejection>,
    limits: GalleryLimits,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self::new(GalleryLimits::default())
    }
}

impl ProductForm {
    /// A blank laptop form.
    #[must_use]
    pub fn new(limits: GalleryLimits) -> Self {
        Self {
            name: String::new(),
            specs: String::new(),
            price: String::new(),
            original_price: String::new(),
            discount: String::new(),
            product_type: ProductType::Laptop,
            category: String::new(),
            condition: None,
            warranty: String::new(),
            availability: Availability::default(),
            featured: false,
            detailed_specs: DetailedSpecs::default(),
            laptop_condition: None,
            free_gifts: Vec::new(),
            gallery: Gallery::new(),
            image_errors: Vec::new(),
            limits,
        }
    }

    /// A form pre-filled from an existing product, for the edit flow.
    #[must_use]
    pub fn from_product(product: &Product, limits: GalleryLimits) -> Self {
        let fields = &product.fields;
        let mut form = Self {
            name: fields.name.clone(),
            specs: fields.specs.clone(),
            price: fields.price.clone(),
            original_price: fields.original_price.clone().unwrap_or_default(),
            discount: fields.discount.map(|d| d.to_string()).unwrap_or_default(),
            product_type: fields.product_type(),
            condition: fields.condition,
            warranty: fields.warranty.clone().unwrap_or_default(),
            availability: fields.availability,
            featured: fields.featured,
            gallery: Gallery::from_stored(&fields.images),
            ..Self::new(limits)
        };

        match &fields.kind {
            ProductKind::Laptop(details) => {
                form.detailed_specs = details.detailed_specs.clone().unwrap_or_default();
                form.laptop_condition = details.laptop_condition.clone();
                form.free_gifts = details.free_gifts.clone().unwrap_or_default();
            }
            ProductKind::Accessory(details) => {
                form.category = details.category.clone().unwrap_or_default();
            }
        }

        form
    }

    #[must_use]
    pub fn apply(mut self, action: FormAction) -> Self {
        let is_laptop = self.product_type == ProductType::Laptop;

        match action {
            FormAction::SetName(v) => self.name = v,
            FormAction::SetSpecs(v) => self.specs = v,
            FormAction::SetPrice(v) => self.price = v,
            FormAction::SetOriginalPrice(v) => self.original_price = v,
            FormAction::SetDiscount(v) => self.discount = v,
            FormAction::SetType(ty) => self.switch_type(ty),
            FormAction::SetCategory(v) => {
                if !is_laptop {
                    self.category = v;
                }
            }
            FormAction::SetCondition(v) => self.condition = v,
            FormAction::SetWarranty(v) => self.warranty = v,
            FormAction::SetAvailability(v) => self.availability = v,
            FormAction::SetFeatured(v) => self.featured = v,

            // Laptop-only sections are read-only while editing an accessory.
            FormAction::SetDetailedSpecs(specs) if is_laptop => self.detailed_specs = specs,
            FormAction::AddUpgradeOption(kind, option) if is_laptop => {
                self.detailed_specs.upgrade_options.add(kind, &option);
            }
            FormAction::RemoveUpgradeOption(kind, option) if is_laptop => {
                self.detailed_specs.upgrade_options.remove(kind, &option);
            }
            FormAction::SetOverallCondition(overall) if is_laptop => {
                self.laptop_condition = Some(match self.laptop_condition.take() {
                    Some(existing) => existing.with_overall(overall),
                    None => LaptopCondition::assessed(overall),
                });
            }
            FormAction::SetConditionDetails(details) if is_laptop => {
                self.laptop_condition
                    .get_or_insert_with(|| LaptopCondition::assessed(OverallCondition::default()))
                    .details = details;
            }
            FormAction::ClearLaptopCondition => self.laptop_condition = None,
            FormAction::TogglePresetGift(gift) if is_laptop => {
                gifts::toggle_gift(&mut self.free_gifts, gift);
            }
            FormAction::AddCustomGift(gift) if is_laptop => {
                if !gift.name.trim().is_empty() {
                    gifts::add_gift(&mut self.free_gifts, gift);
                }
            }
            FormAction::RemoveGift(id) => gifts::remove_gift(&mut self.free_gifts, &id),
            FormAction::SetDetailedSpecs(_)
            | FormAction::AddUpgradeOption(..)
            | FormAction::RemoveUpgradeOption(..)
            | FormAction::SetOverallCondition(_)
            | FormAction::SetConditionDetails(_)
            | FormAction::TogglePresetGift(_)
            | FormAction::AddCustomGift(_) => {}

            FormAction::AddImages(files) => {
                let rejections = self.gallery.add_files(files, &self.limits);
                self.image_errors.extend(rejections);
            }
            FormAction::RemoveImage(index) => {
                self.gallery.remove(index);
            }
            FormAction::SetPrimaryImage(index) => self.gallery.set_primary(index),
            FormAction::DismissImageErrors => self.image_errors.clear(),
        }

        self
    }

    fn switch_type(&mut self, ty: ProductType) {
        if ty == self.product_type {
            return;
        }
        self.product_type = ty;
        match ty {
            ProductType::Accessory => {
                self.detailed_specs = DetailedSpecs::default();
                self.laptop_condition = None;
                self.free_gifts.clear();
            }
            ProductType::Laptop => self.category.clear(),
        }
    }

    /// Checks the form without touching the network. Pending images count
    /// toward the image cap but their URLs are not known yet.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.gallery.len() > self.limits.max_images {
            return Err(ValidationError::TooManyImages {
                count: self.gallery.len(),
                max: self.limits.max_images,
            });
        }
        self.build(ProductImages::empty()).map(|_| ())
    }

    /// Builds the final payload using `images` as the resolved image set.
    ///
    /// Blank optional text becomes `None`; empty laptop sub-records are omitted.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the payload breaks an invariant.
    pub fn assemble(&self, images: ProductImages) -> Result<ProductFields, ValidationError> {
        self.build(images)
    }

    fn build(&self, images: ProductImages) -> Result<ProductFields, ValidationError> {
        let discount = validation::parse_discount(&self.discount)?;

        let kind = match self.product_type {
            ProductType::Laptop => ProductKind::Laptop(LaptopDetails {
                detailed_specs: (!self.detailed_specs.is_empty())
                    .then(|| self.detailed_specs.clone()),
                laptop_condition: self.laptop_condition.clone(),
                free_gifts: (!self.free_gifts.is_empty()).then(|| self.free_gifts.clone()),
            }),
            ProductType::Accessory => ProductKind::Accessory(AccessoryDetails {
                category: non_blank(&self.category),
            }),
        };

        let fields = ProductFields {
            name: self.name.trim().to_string(),
            specs: self.specs.trim().to_string(),
            price: self.price.trim().to_string(),
            original_price: non_blank(&self.original_price),
            discount,
            condition: self.condition,
            warranty: non_blank(&self.warranty),
            availability: self.availability,
            featured: self.featured,
            images,
            kind,
        };

        validation::validate_fields(&fields)?;
        Ok(fields)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn specs(&self) -> &str {
        &self.specs
    }

    #[must_use]
    pub fn price(&self) -> &str {
        &self.price
    }

    #[must_use]
    pub fn original_price(&self) -> &str {
        &self.original_price
    }

    #[must_use]
    pub fn discount(&self) -> &str {
        &self.discount
    }

    #[must_use]
    pub fn product_type(&self) -> ProductType {
        self.product_type
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn condition(&self) -> Option<Condition> {
        self.condition
    }

    #[must_use]
    pub fn warranty(&self) -> &str {
        &self.warranty
    }

    #[must_use]
    pub fn availability(&self) -> Availability {
        self.availability
    }

    #[must_use]
    pub fn featured(&self) -> bool {
        self.featured
    }

    #[must_use]
    pub fn detailed_specs(&self) -> &DetailedSpecs {
        &self.detailed_specs
    }

    #[must_use]
    pub fn laptop_condition(&self) -> Option<&LaptopCondition> {
        self.laptop_condition.as_ref()
    }

    #[must_use]
    pub fn free_gifts(&self) -> &[FreeGift] {
        &self.free_gifts
    }

    #[must_use]
    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    /// Per-file rejections from the latest image additions.
    #[must_use]
    pub fn image_errors(&self) -> &[ImageRejection] {
        &self.image_errors
    }

    #[must_use]
    pub fn limits(&self) -> GalleryLimits {
        self.limits
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
#[path = "form_test.rs"]
mod tests;
