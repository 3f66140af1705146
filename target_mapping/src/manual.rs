/*!

This is the long-form manual for `target_mapping` and `targetmap`.

## Matching the categories

A survey export and an official target file are usually written by different people.
The same category may appear as `Homme`, `homme `, `HOMME` or `Hômme`. Both sides are
compared through a canonical key:

1. surrounding spaces are removed
2. the label is put in lowercase
3. the accents are removed (`é` becomes `e`)
4. any run of characters other than `a-z` and `0-9` becomes one space, and no space is
   kept at the start or the end

With these rules, `18-24 ans`, `18 – 24 ans` and `18/24 ANS` are the same category. Singular
and plural forms are not the same category: `Homme` does not match `Hommes`.

For every category of the survey, the comparison table contains one line:

| survey label | survey % | official label | official % | difference |
|--------------|----------|----------------|------------|------------|
| Hommes       | 45.2     | hommes         | 48         | -2.8       |
| Autre        | 3        |                |            |            |

The survey percentages and the differences are rounded to 4 decimals. The official percentages
are shown exactly as read: they are not rescaled, even if they do not sum to 100. The official
categories that do not match any survey category are listed separately.

## Input formats

The following formats are supported for the target files:
* `csv` Comma Separated Values
* `xlsx` Excel workbooks

When the format is not given, it is deduced from the extension of the file.

### `csv`

The first line is the header. The separator is detected from the first lines of the file
(tab, `;`, `,` or `|`), or can be given with the `csvDelimiter` option.

```text
Modalité;Pourcentage
Hommes;48,0%
Femmes;52,0%
```

### `xlsx`

The first row of the worksheet is the header. The first worksheet is used unless the
`excelWorksheetName` option is set.

Note that a cell formatted as a percentage in Excel stores a fraction: `48%` is read as `0.48`.
Such files should store the percentages as numbers or text instead.

### Percentages

A percentage cell may use a comma or a dot as decimal separator and may be followed by a `%`
sign: `12,5%`, `12.5` and `12.5 %` all read as `12.5`. Rows in which no number can be read are
ignored. If the same category appears several times, the last row is used.

### Survey distribution

The distribution computed from the survey data is a JSON object, with the percentages of each
category for every variable:

```json
{
  "sexe": { "Hommes": 45.2, "Femmes": 54.8 },
  "age": { "18-34 ans": 28.0, "35-64 ans": 45.5, "65 ans et +": 26.5 }
}
```

## Configuration

A project is described in a JSON file. The paths are relative to the location of the
configuration file.

```json
{
  "outputSettings": { "projectName": "Baromètre 2024" },
  "surveyDistributionPath": "survey_dist.json",
  "targets": [
    {
      "variable": "sexe",
      "filePath": "sexe.csv",
      "categoryColumn": "Modalité",
      "percentColumn": "Pourcentage"
    }
  ],
  "rules": { "differenceThreshold": 5.0 }
}
```

Options for each target:
 - `variable` (string): the name of the variable in the survey distribution
 - `filePath` (string): the target file
 - `provider` (string, optional): `csv` or `xlsx`
 - `categoryColumn`, `percentColumn` (strings): the names of the columns in the header
 - `csvDelimiter` (string of one character, optional)
 - `excelWorksheetName` (string, optional)

Rules:
 - `differenceThreshold` (number, default 5): differences above this value, in either
   direction, are flagged in the output
 - `maxVariables` (number, default 3): the number of variables that can be weighted together

 */
